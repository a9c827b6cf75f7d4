//! The relation annotation workflow.
//!
//! A sequencer over an immutable candidate-pair queue. The host labels the
//! presented pair, can jump back to re-label an earlier one, and resumes
//! exactly where it left off afterwards.
//!
//! # States
//!
//! ```text
//!            start()            choose()/answer_*()         past the end
//!   Start ───────────▶ Presenting(i) ─────────────▶ ... ──────────────▶ Done
//!                        │     ▲  │                                      │
//!          verify_links  │     │  └── edit_previous(k) / go_back() ◀─────┘
//!                        ▼     │
//!                     Verifying(i)
//!              canonical check → link check
//!              (subject side, then object side)
//! ```
//!
//! # Example
//!
//! ```rust
//! use kbpo::{AnnotationConfig, AnnotationWorkflow, MentionPairGenerator, WorkflowState};
//! use kbpo_core::{AnnotationSession, Document, MentionType, Span};
//!
//! let doc = Document::from_json(r#"{"sentences": [[
//!     {"word": "Alice", "span": [0, 5]}, {"word": "joined", "span": [6, 12]},
//!     {"word": "Acme", "span": [13, 17]}]]}"#).unwrap();
//! let mut session = AnnotationSession::new(doc);
//! for (b, e, ty) in [(0, 5, MentionType::Person), (13, 17, MentionType::Organization)] {
//!     let m = session.create_mention(Span::new(b, e)).unwrap();
//!     session.set_mention_type(m, ty).unwrap();
//!     session.create_entity(m).unwrap();
//! }
//!
//! let config = AnnotationConfig::default();
//! let pairs = MentionPairGenerator::new(&config).generate(&session);
//! let mut workflow = AnnotationWorkflow::new(pairs, &config);
//! workflow.start().unwrap();
//! workflow.choose(&mut session, "per:employee_or_member_of").unwrap();
//! assert_eq!(workflow.state(), WorkflowState::Done);
//!
//! let relations = workflow.finalize(&session).unwrap();
//! assert_eq!(relations[0].relation, "per:employee_or_member_of");
//! ```

use crate::config::AnnotationConfig;
use crate::error::{Error, Result};
use crate::pairs::{MentionPair, PairId};
use crate::relation::{RelationCatalog, RelationLabel, NO_RELATION};
use kbpo_core::{
    AnnotationSession, EntityId, LinkingMethod, MentionId, MentionRecord, MentionType,
};
use serde::{Deserialize, Serialize};

/// Externally visible workflow state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowState {
    /// Not started yet.
    Start,
    /// Waiting for a relation choice on this pair.
    Presenting(PairId),
    /// A relation was chosen for this pair and its mentions are being verified.
    Verifying(PairId),
    /// Every pair has been decided.
    Done,
}

/// Which mention of a pair a verification step is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// The subject mention
    Subject,
    /// The object mention
    Object,
}

/// A question the host must answer before the workflow can continue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationRequest {
    /// Does `mention` really refer to the entity founded by `canonical`?
    /// Answer with [`AnnotationWorkflow::answer_canonical`].
    CanonicalMention {
        /// Pair being verified
        pair: PairId,
        /// Side being verified
        side: Side,
        /// Mention in the pair
        mention: MentionId,
        /// Its entity
        entity: EntityId,
        /// The entity's canonical mention
        canonical: MentionId,
    },
    /// Find the wiki page for `entity`, starting from `query`.
    /// Answer with [`AnnotationWorkflow::answer_link`].
    WikiLink {
        /// Pair being verified
        pair: PairId,
        /// Side being verified
        side: Side,
        /// Entity to link
        entity: EntityId,
        /// Search string: the link without its `wiki:` prefix, else the entity gloss
        query: String,
    },
    /// Pick the normalized date for `entity`.
    /// Answer with [`AnnotationWorkflow::answer_link`].
    DateLink {
        /// Pair being verified
        pair: PairId,
        /// Side being verified
        side: Side,
        /// Entity to link
        entity: EntityId,
        /// Mention surface text
        gloss: String,
        /// Current link, if any
        current: Option<String>,
    },
}

/// Outcome of an external link lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkResolution {
    /// The host found a link.
    Resolved(String),
    /// The host dismissed the lookup. Recorded as "no link".
    Dismissed,
}

/// Notifications delivered to listeners registered with [`AnnotationWorkflow::on_event`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowEvent {
    /// A pair is now waiting for a relation choice.
    Presenting {
        /// The pair
        pair: PairId,
    },
    /// A relation became visible in the result list.
    RelationRecorded {
        /// The pair
        pair: PairId,
        /// Relation name
        relation: String,
    },
    /// A previously visible relation was withdrawn before re-labeling.
    RelationRetracted {
        /// The pair
        pair: PairId,
        /// Relation name
        relation: String,
    },
    /// The host must answer a verification question.
    VerificationRequested(VerificationRequest),
    /// The queue is exhausted.
    Done,
}

/// One emitted relation: `(subject, relation, object)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationRecord {
    /// Subject mention
    pub subject: MentionRecord,
    /// Relation name
    pub relation: String,
    /// Object mention
    pub object: MentionRecord,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Canonical,
    Link,
}

#[derive(Debug, Clone)]
struct PendingVerification {
    pair: PairId,
    relation: String,
    side: Side,
    step: Step,
    request: Option<VerificationRequest>,
}

type Listener<'a> = Box<dyn FnMut(&WorkflowEvent) + 'a>;

/// Drives an annotator through a candidate-pair queue exactly once each.
pub struct AnnotationWorkflow<'a> {
    pairs: Vec<MentionPair>,
    /// `None` before start; `pairs.len()` once past the end.
    current: Option<usize>,
    view_stack: Vec<PairId>,
    state: WorkflowState,
    pending: Option<PendingVerification>,
    catalog: &'a RelationCatalog,
    verify_links: bool,
    listeners: Vec<Listener<'a>>,
}

impl std::fmt::Debug for AnnotationWorkflow<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnnotationWorkflow")
            .field("pairs", &self.pairs.len())
            .field("current", &self.current)
            .field("view_stack", &self.view_stack)
            .field("state", &self.state)
            .field("verify_links", &self.verify_links)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl AnnotationWorkflow<'static> {
    /// Create a workflow over the built-in catalog.
    #[must_use]
    pub fn new(pairs: Vec<MentionPair>, config: &AnnotationConfig) -> Self {
        Self {
            pairs,
            current: None,
            view_stack: Vec::new(),
            state: WorkflowState::Start,
            pending: None,
            catalog: RelationCatalog::kbp(),
            verify_links: config.verify_links,
            listeners: Vec::new(),
        }
    }
}

impl<'a> AnnotationWorkflow<'a> {
    /// Use a different catalog. Only valid before [`start`](Self::start).
    #[must_use]
    pub fn with_catalog<'b>(self, catalog: &'b RelationCatalog) -> AnnotationWorkflow<'b>
    where
        'a: 'b,
    {
        AnnotationWorkflow {
            pairs: self.pairs,
            current: self.current,
            view_stack: self.view_stack,
            state: self.state,
            pending: self.pending,
            catalog,
            verify_links: self.verify_links,
            listeners: self.listeners,
        }
    }

    /// Register a listener on this workflow instance.
    pub fn on_event(&mut self, listener: impl FnMut(&WorkflowEvent) + 'a) {
        self.listeners.push(Box::new(listener));
    }

    fn emit(&mut self, event: WorkflowEvent) {
        for listener in &mut self.listeners {
            listener(&event);
        }
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// Current state.
    #[must_use]
    pub fn state(&self) -> WorkflowState {
        self.state
    }

    /// The queue, with relations as currently recorded.
    #[must_use]
    pub fn pairs(&self) -> &[MentionPair] {
        &self.pairs
    }

    /// The pair being presented or verified.
    #[must_use]
    pub fn current_pair(&self) -> Option<&MentionPair> {
        match self.state {
            WorkflowState::Presenting(id) | WorkflowState::Verifying(id) => self.pairs.get(id),
            _ => None,
        }
    }

    /// Indices to resume at after an edit detour, most recent last.
    #[must_use]
    pub fn view_stack(&self) -> &[PairId] {
        &self.view_stack
    }

    /// Whether [`go_back`](Self::go_back) would be accepted.
    #[must_use]
    pub fn can_go_back(&self) -> bool {
        matches!(self.state, WorkflowState::Presenting(_) | WorkflowState::Done)
            && self.current.is_some_and(|c| c > 0)
    }

    /// The verification question awaiting an answer, if any.
    #[must_use]
    pub fn pending_request(&self) -> Option<&VerificationRequest> {
        self.pending.as_ref().and_then(|p| p.request.as_ref())
    }

    /// Labels the host may offer for the current pair, in catalog order.
    pub fn candidates(&self, session: &AnnotationSession) -> Result<Vec<&'a RelationLabel>> {
        let WorkflowState::Presenting(id) = self.state else {
            return Err(Error::invalid_state(format!(
                "no pair is being presented ({:?})",
                self.state
            )));
        };
        let (subject, object) = self.pair_types(session, id)?;
        let catalog: &'a RelationCatalog = self.catalog;
        Ok(catalog.candidates(subject, object).collect())
    }

    fn pair_types(&self, session: &AnnotationSession, id: PairId) -> Result<(MentionType, MentionType)> {
        let pair = &self.pairs[id];
        let type_of = |m: MentionId| -> Result<MentionType> {
            session
                .mention(m)
                .ok_or(kbpo_core::Error::UnknownMention(m))?
                .mention_type
                .ok_or_else(|| kbpo_core::Error::UntypedMention(m).into())
        };
        Ok((type_of(pair.subject)?, type_of(pair.object)?))
    }

    // -------------------------------------------------------------------------
    // Transitions
    // -------------------------------------------------------------------------

    /// Present the first pair.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidState`] if already started or if the queue is empty.
    pub fn start(&mut self) -> Result<()> {
        if self.state != WorkflowState::Start {
            return Err(Error::invalid_state("workflow already started"));
        }
        if self.pairs.is_empty() {
            return Err(Error::invalid_state("no candidate pairs to annotate"));
        }
        self.current = None;
        self.view_stack.clear();
        log::debug!("starting workflow over {} pairs", self.pairs.len());
        self.advance(None);
        Ok(())
    }

    /// Move to `explicit`, else to the top of the view stack, else one forward.
    fn advance(&mut self, explicit: Option<PairId>) {
        let next = explicit
            .or_else(|| self.view_stack.pop())
            .unwrap_or_else(|| self.current.map_or(0, |c| c + 1));

        if next >= self.pairs.len() {
            self.current = Some(self.pairs.len());
            self.state = WorkflowState::Done;
            log::info!(
                "annotation complete: {} of {} pairs carry a relation",
                self.recorded_count(),
                self.pairs.len()
            );
            self.emit(WorkflowEvent::Done);
        } else {
            self.current = Some(next);
            self.state = WorkflowState::Presenting(next);
            self.emit(WorkflowEvent::Presenting { pair: next });
        }
    }

    fn recorded_count(&self) -> usize {
        self.pairs
            .iter()
            .filter(|p| p.relation.as_deref().is_some_and(|r| r != NO_RELATION))
            .count()
    }

    /// Label the presented pair.
    ///
    /// Without link verification the choice is committed at once and the
    /// workflow advances. With it, the workflow enters
    /// [`WorkflowState::Verifying`] first.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidState`] if no pair is being presented
    /// - [`Error::UnknownRelation`] if the catalog has no such relation
    /// - [`Error::InapplicableRelation`] if it does not fit the pair's types
    pub fn choose(&mut self, session: &mut AnnotationSession, relation: &str) -> Result<()> {
        let WorkflowState::Presenting(id) = self.state else {
            return Err(Error::invalid_state(format!(
                "cannot choose a relation in state {:?}",
                self.state
            )));
        };
        let label = self.catalog.require(relation)?;
        let (subject, object) = self.pair_types(session, id)?;
        if !label.is_applicable(subject, object) {
            return Err(Error::InapplicableRelation {
                relation: relation.to_string(),
                subject: subject.to_string(),
                object: object.to_string(),
            });
        }

        if self.verify_links {
            self.state = WorkflowState::Verifying(id);
            self.pending = Some(PendingVerification {
                pair: id,
                relation: relation.to_string(),
                side: Side::Subject,
                step: Step::Canonical,
                request: None,
            });
            self.resume(session)
        } else {
            self.commit(id, relation);
            Ok(())
        }
    }

    /// Record `relation` on pair `id` and advance.
    fn commit(&mut self, id: PairId, relation: &str) {
        let previous = self.pairs[id].relation.clone();
        if previous.as_deref() != Some(relation) {
            if let Some(old) = previous.filter(|r| r != NO_RELATION) {
                self.emit(WorkflowEvent::RelationRetracted {
                    pair: id,
                    relation: old,
                });
            }
            self.pairs[id].relation = Some(relation.to_string());
            if relation != NO_RELATION {
                self.emit(WorkflowEvent::RelationRecorded {
                    pair: id,
                    relation: relation.to_string(),
                });
            }
        }
        self.advance(None);
    }

    /// Jump back to re-label pair `id`, remembering where to resume.
    ///
    /// Any pair up to the furthest position reached is accepted, including
    /// pairs after the current one while a detour is open. Editing the pair
    /// being presented outside a detour presents it again after the choice.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidState`] unless presenting or done, or if `id` has not
    /// been reached yet.
    pub fn edit_previous(&mut self, id: PairId) -> Result<()> {
        if !matches!(self.state, WorkflowState::Presenting(_) | WorkflowState::Done) {
            return Err(Error::invalid_state(format!(
                "cannot edit a previous pair in state {:?}",
                self.state
            )));
        }
        let current = self.current.unwrap_or(0);
        let reached = self
            .view_stack
            .first()
            .copied()
            .unwrap_or(current)
            .min(self.pairs.len().saturating_sub(1));
        if id >= self.pairs.len() || id > reached {
            return Err(Error::invalid_state(format!(
                "pair {} is out of range (reached {}, queue length {})",
                id,
                reached,
                self.pairs.len()
            )));
        }
        if self.view_stack.is_empty() {
            self.view_stack.push(current);
        }
        log::debug!("editing pair {} (resume at {:?})", id, self.view_stack.last());
        self.advance(Some(id));
        Ok(())
    }

    /// Re-label the pair before the current one.
    pub fn go_back(&mut self) -> Result<()> {
        match self.current {
            Some(c) if c > 0 => self.edit_previous(c - 1),
            _ => Err(Error::invalid_state("already at the first pair")),
        }
    }

    // -------------------------------------------------------------------------
    // Link verification
    // -------------------------------------------------------------------------

    /// Answer a [`VerificationRequest::CanonicalMention`].
    pub fn answer_canonical(&mut self, session: &mut AnnotationSession, correct: bool) -> Result<()> {
        let entity = match self.pending_request() {
            Some(VerificationRequest::CanonicalMention { entity, .. }) => *entity,
            other => {
                return Err(Error::invalid_state(format!(
                    "not awaiting a canonical check (pending: {:?})",
                    other
                )))
            }
        };
        session.set_canonical_correct(entity, correct)?;
        session.set_link_gold(entity, None)?;
        if let Some(pending) = self.pending.as_mut() {
            pending.request = None;
            if correct {
                pending.step = Step::Link;
            }
        }
        if !correct {
            return self.finish_side(session);
        }
        self.resume(session)
    }

    /// Answer a [`VerificationRequest::WikiLink`] or [`VerificationRequest::DateLink`].
    pub fn answer_link(
        &mut self,
        session: &mut AnnotationSession,
        resolution: LinkResolution,
    ) -> Result<()> {
        let entity = match self.pending_request() {
            Some(
                VerificationRequest::WikiLink { entity, .. }
                | VerificationRequest::DateLink { entity, .. },
            ) => *entity,
            other => {
                return Err(Error::invalid_state(format!(
                    "not awaiting a link (pending: {:?})",
                    other
                )))
            }
        };
        let link = match resolution {
            LinkResolution::Resolved(link) => Some(link),
            LinkResolution::Dismissed => None,
        };
        session.set_link_gold(entity, link)?;
        if let Some(pending) = self.pending.as_mut() {
            pending.request = None;
        }
        self.finish_side(session)
    }

    /// Run verification steps until one needs the host or the chain ends.
    fn resume(&mut self, session: &mut AnnotationSession) -> Result<()> {
        loop {
            let Some(pending) = self.pending.as_ref() else {
                return Ok(());
            };
            let (pair_id, side, step) = (pending.pair, pending.side, pending.step);
            let pair = &self.pairs[pair_id];
            let mention_id = match side {
                Side::Subject => pair.subject,
                Side::Object => pair.object,
            };
            let Some(entity) = session.entity_of(mention_id) else {
                log::debug!("m-{} has no entity, nothing to verify", mention_id);
                return self.finish_side(session);
            };
            let entity_id = entity.id;

            let request = match step {
                Step::Canonical => {
                    let canonical = entity
                        .canonical_mention()
                        .ok_or(kbpo_core::Error::UnknownEntity(entity_id))?;
                    if canonical == mention_id {
                        session.set_canonical_correct(entity_id, true)?;
                        if let Some(p) = self.pending.as_mut() {
                            p.step = Step::Link;
                        }
                        continue;
                    }
                    VerificationRequest::CanonicalMention {
                        pair: pair_id,
                        side,
                        mention: mention_id,
                        entity: entity_id,
                        canonical,
                    }
                }
                Step::Link => match entity.entity_type.linking() {
                    LinkingMethod::None => {
                        let link = entity.link.clone();
                        session.set_link_gold(entity_id, link)?;
                        return self.finish_side(session);
                    }
                    LinkingMethod::DatePicker => VerificationRequest::DateLink {
                        pair: pair_id,
                        side,
                        entity: entity_id,
                        gloss: session
                            .mention(mention_id)
                            .map(|m| m.gloss.clone())
                            .unwrap_or_default(),
                        current: entity.link.clone(),
                    },
                    LinkingMethod::WikiSearch => VerificationRequest::WikiLink {
                        pair: pair_id,
                        side,
                        entity: entity_id,
                        query: entity
                            .link
                            .as_deref()
                            .and_then(|l| l.strip_prefix("wiki:"))
                            .unwrap_or(&entity.gloss)
                            .to_string(),
                    },
                },
            };

            if let Some(p) = self.pending.as_mut() {
                p.request = Some(request.clone());
            }
            self.emit(WorkflowEvent::VerificationRequested(request));
            return Ok(());
        }
    }

    /// The current side is settled: move to the object side, or commit.
    fn finish_side(&mut self, session: &mut AnnotationSession) -> Result<()> {
        let Some(pending) = self.pending.as_mut() else {
            return Ok(());
        };
        match pending.side {
            Side::Subject => {
                pending.side = Side::Object;
                pending.step = Step::Canonical;
                pending.request = None;
                self.resume(session)
            }
            Side::Object => {
                let (id, relation) = (pending.pair, pending.relation.clone());
                self.pending = None;
                self.commit(id, &relation);
                Ok(())
            }
        }
    }

    // -------------------------------------------------------------------------
    // Output
    // -------------------------------------------------------------------------

    /// Emit every pair labeled with a real relation, in queue order.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidState`] unless the workflow is done.
    pub fn finalize(&self, session: &AnnotationSession) -> Result<Vec<RelationRecord>> {
        if self.state != WorkflowState::Done {
            return Err(Error::invalid_state(format!(
                "cannot finalize in state {:?}",
                self.state
            )));
        }
        self.pairs
            .iter()
            .filter_map(|p| {
                p.relation
                    .as_deref()
                    .filter(|r| *r != NO_RELATION)
                    .map(|r| (p, r))
            })
            .map(|(p, relation)| {
                Ok(RelationRecord {
                    subject: session.mention_record(p.subject)?,
                    relation: relation.to_string(),
                    object: session.mention_record(p.object)?,
                })
            })
            .collect()
    }
}
