//! The annotation session: an arena owning every mention and entity of one
//! document, plus the mention → entity lookup and the id counters.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     AnnotationSession                        │
//! ├──────────────────────────────────────────────────────────────┤
//! │  document: Document            (tokens, sentence indices)    │
//! │  mentions: MentionId → Mention (span, type, gloss, entity)   │
//! │  entities: EntityId  → Entity  (mentions[0] is canonical)    │
//! │  mention_to_entity             (the cluster lookup)          │
//! │  span_index: Span → MentionId  (uniqueness key)              │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Sessions are independent. Two sessions never share ids or lookups, and
//! dropping a session tears everything down.

use crate::document::{gloss_from_tokens, Document};
use crate::entity::{Entity, EntityId, Mention, MentionId, MentionType, Span};
use crate::error::{Error, Result};
use crate::record::{EntityRecord, MentionRecord};
use crate::similarity::word_levenshtein;
use std::collections::{BTreeMap, HashMap};

/// Owner of all mention and entity state for one document.
///
/// # Example
///
/// ```rust
/// use kbpo_core::{AnnotationSession, Document, MentionType, Span};
///
/// let doc = Document::from_json(r#"{"sentences": [[
///     {"word": "Obama", "span": [0, 5], "pos_tag": "NNP"},
///     {"word": "spoke", "span": [6, 11]},
///     {"word": ".", "span": [11, 12]}],
///    [{"word": "He", "span": [13, 15], "pos_tag": "PRP"},
///     {"word": "left", "span": [16, 20]}]]}"#).unwrap();
///
/// let mut session = AnnotationSession::new(doc);
/// let obama = session.create_mention(Span::new(0, 5)).unwrap();
/// session.set_mention_type(obama, MentionType::Person).unwrap();
/// let e = session.create_entity(obama).unwrap();
///
/// let he = session.create_mention(Span::new(13, 15)).unwrap();
/// session.add_mention(e, he).unwrap();
///
/// assert_eq!(session.entity_of(he).unwrap().id, e);
/// assert_eq!(session.mention(he).unwrap().mention_type, Some(MentionType::Person));
/// ```
#[derive(Debug, Clone)]
pub struct AnnotationSession {
    document: Document,
    mentions: BTreeMap<MentionId, Mention>,
    entities: BTreeMap<EntityId, Entity>,
    mention_to_entity: HashMap<MentionId, EntityId>,
    span_index: HashMap<Span, MentionId>,
    next_mention_id: MentionId,
    next_entity_id: EntityId,
}

impl AnnotationSession {
    /// Create a session over a tokenized document.
    #[must_use]
    pub fn new(document: Document) -> Self {
        Self {
            document,
            mentions: BTreeMap::new(),
            entities: BTreeMap::new(),
            mention_to_entity: HashMap::new(),
            span_index: HashMap::new(),
            next_mention_id: 0,
            next_entity_id: 1,
        }
    }

    /// The underlying document.
    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }

    // -------------------------------------------------------------------------
    // Mentions
    // -------------------------------------------------------------------------

    /// Create a mention over `span`.
    ///
    /// The gloss joins the covered tokens (one space per gap in the source) and
    /// the sentence index comes from the first covered token.
    ///
    /// # Errors
    ///
    /// - [`Error::EmptySpan`] if the span covers no token
    /// - [`Error::DuplicateMention`] if a mention already exists at `span`
    pub fn create_mention(&mut self, span: Span) -> Result<MentionId> {
        if self.span_index.contains_key(&span) {
            return Err(Error::duplicate_mention(span.begin, span.end));
        }
        let tokens = self.document.tokens_in(span);
        let first = tokens
            .first()
            .ok_or_else(|| Error::empty_span(span.begin, span.end))?;

        let id = self.next_mention_id;
        let mention = Mention {
            id,
            span,
            mention_type: None,
            gloss: gloss_from_tokens(&tokens),
            entity: None,
            sentence_index: first.sentence,
            head_pos: first.token.pos_tag.clone(),
        };
        log::debug!("created mention m-{} '{}' at {}", id, mention.gloss, span);

        self.mentions.insert(id, mention);
        self.span_index.insert(span, id);
        self.next_mention_id += 1;
        Ok(id)
    }

    /// Get a mention by id.
    #[must_use]
    pub fn mention(&self, id: MentionId) -> Option<&Mention> {
        self.mentions.get(&id)
    }

    fn mention_mut(&mut self, id: MentionId) -> Result<&mut Mention> {
        self.mentions.get_mut(&id).ok_or(Error::UnknownMention(id))
    }

    /// Get the mention registered at `span`.
    #[must_use]
    pub fn mention_at(&self, span: Span) -> Option<&Mention> {
        self.span_index
            .get(&span)
            .and_then(|id| self.mentions.get(id))
    }

    /// All mentions, in creation order.
    pub fn mentions(&self) -> impl Iterator<Item = &Mention> {
        self.mentions.values()
    }

    /// All mentions, sorted by document position.
    #[must_use]
    pub fn mentions_in_document_order(&self) -> Vec<&Mention> {
        let mut mentions: Vec<&Mention> = self.mentions.values().collect();
        mentions.sort_by_key(|m| (m.span.begin, m.span.end, m.id));
        mentions
    }

    /// Number of live mentions.
    #[must_use]
    pub fn mention_count(&self) -> usize {
        self.mentions.len()
    }

    /// Assign a type to a mention.
    ///
    /// A mention that already belongs to an entity must keep the entity's type.
    pub fn set_mention_type(&mut self, id: MentionId, mention_type: MentionType) -> Result<()> {
        if let Some(entity) = self.entity_of(id) {
            if entity.entity_type != mention_type {
                return Err(Error::invalid_input(format!(
                    "mention m-{} belongs to {} of type {}, cannot retype to {}",
                    id,
                    entity.display_id(),
                    entity.entity_type,
                    mention_type
                )));
            }
        }
        self.mention_mut(id)?.mention_type = Some(mention_type);
        Ok(())
    }

    /// Remove a mention from the session, freeing its span.
    ///
    /// The mention is detached from its entity first. Returns the id of the
    /// entity if that left it empty; destroying it is up to the caller.
    pub fn delete_mention(&mut self, id: MentionId) -> Result<Option<EntityId>> {
        let entity_id = self.mention(id).ok_or(Error::UnknownMention(id))?.entity;
        let emptied = match entity_id {
            Some(e) => (!self.remove_mention(e, id)?).then_some(e),
            None => None,
        };
        if let Some(mention) = self.mentions.remove(&id) {
            self.span_index.remove(&mention.span);
            log::debug!("deleted mention m-{} '{}'", id, mention.gloss);
        }
        Ok(emptied)
    }

    // -------------------------------------------------------------------------
    // Entities
    // -------------------------------------------------------------------------

    /// Found a new singleton entity with `canonical` as member 0.
    ///
    /// # Errors
    ///
    /// - [`Error::UntypedMention`] if the mention has no type
    /// - [`Error::InvalidInput`] if the mention already belongs to an entity
    pub fn create_entity(&mut self, canonical: MentionId) -> Result<EntityId> {
        let mention = self
            .mentions
            .get(&canonical)
            .ok_or(Error::UnknownMention(canonical))?;
        let entity_type = mention
            .mention_type
            .ok_or(Error::UntypedMention(canonical))?;
        if let Some(existing) = mention.entity {
            return Err(Error::invalid_input(format!(
                "mention m-{} already belongs to e-{}",
                canonical, existing
            )));
        }

        let id = self.next_entity_id;
        let entity = Entity {
            id,
            entity_type,
            gloss: mention.gloss.clone(),
            span: mention.span,
            mentions: Vec::new(),
            link: None,
            canonical_correct: None,
            link_gold: None,
        };
        log::debug!("created entity e-{} '{}' ({})", id, entity.gloss, entity_type);
        self.entities.insert(id, entity);
        self.next_entity_id += 1;

        self.add_mention(id, canonical)?;
        Ok(id)
    }

    /// Append a mention to an entity.
    ///
    /// The mention takes the entity's type and is registered in the lookup.
    /// Adding a mention to the entity it already belongs to is a no-op.
    pub fn add_mention(&mut self, entity_id: EntityId, mention_id: MentionId) -> Result<()> {
        let entity_type = self
            .entities
            .get(&entity_id)
            .ok_or(Error::UnknownEntity(entity_id))?
            .entity_type;
        let mention = self.mention_mut(mention_id)?;
        match mention.entity {
            Some(current) if current == entity_id => return Ok(()),
            Some(current) => {
                return Err(Error::invalid_input(format!(
                    "mention m-{} already belongs to e-{}; reassign it instead",
                    mention_id, current
                )))
            }
            None => {}
        }
        if mention.mention_type.is_some_and(|t| t != entity_type) {
            log::debug!(
                "retyping mention m-{} to {} on joining e-{}",
                mention_id,
                entity_type,
                entity_id
            );
        }
        mention.mention_type = Some(entity_type);
        mention.entity = Some(entity_id);

        if let Some(entity) = self.entities.get_mut(&entity_id) {
            entity.mentions.push(mention_id);
        }
        self.mention_to_entity.insert(mention_id, entity_id);
        Ok(())
    }

    /// Detach a mention from an entity.
    ///
    /// Returns whether the entity still has members. The entity is not
    /// deleted here; call [`remove_entity`](Self::remove_entity) when this
    /// returns `false`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidInput`] if the mention is not a member, or if it is the
    /// canonical mention and other members remain.
    pub fn remove_mention(&mut self, entity_id: EntityId, mention_id: MentionId) -> Result<bool> {
        let entity = self
            .entities
            .get_mut(&entity_id)
            .ok_or(Error::UnknownEntity(entity_id))?;
        let index = entity
            .mentions
            .iter()
            .position(|&m| m == mention_id)
            .ok_or_else(|| {
                Error::invalid_input(format!(
                    "mention m-{} is not a member of e-{}",
                    mention_id, entity_id
                ))
            })?;
        if index == 0 && entity.mentions.len() > 1 {
            return Err(Error::invalid_input(format!(
                "m-{} is the canonical mention of e-{} and other mentions remain",
                mention_id, entity_id
            )));
        }
        entity.mentions.remove(index);
        let still_non_empty = !entity.mentions.is_empty();

        self.mention_to_entity.remove(&mention_id);
        if let Some(mention) = self.mentions.get_mut(&mention_id) {
            mention.entity = None;
        }
        log::debug!("removed mention m-{} from e-{}", mention_id, entity_id);
        Ok(still_non_empty)
    }

    /// Move a mention into another entity.
    ///
    /// Returns the id of the previous entity if it was left empty.
    pub fn reassign_mention(
        &mut self,
        mention_id: MentionId,
        entity_id: EntityId,
    ) -> Result<Option<EntityId>> {
        if !self.entities.contains_key(&entity_id) {
            return Err(Error::UnknownEntity(entity_id));
        }
        let previous = self
            .mention(mention_id)
            .ok_or(Error::UnknownMention(mention_id))?
            .entity;
        let emptied = match previous {
            Some(p) if p == entity_id => return Ok(None),
            Some(p) => (!self.remove_mention(p, mention_id)?).then_some(p),
            None => None,
        };
        self.add_mention(entity_id, mention_id)?;
        Ok(emptied)
    }

    /// Drop an entity, detaching any members it still has.
    pub fn remove_entity(&mut self, id: EntityId) -> Result<Entity> {
        let entity = self.entities.remove(&id).ok_or(Error::UnknownEntity(id))?;
        for mention_id in &entity.mentions {
            self.mention_to_entity.remove(mention_id);
            if let Some(mention) = self.mentions.get_mut(mention_id) {
                mention.entity = None;
            }
        }
        log::debug!("removed entity e-{} '{}'", id, entity.gloss);
        Ok(entity)
    }

    /// Get an entity by id.
    #[must_use]
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    fn entity_mut(&mut self, id: EntityId) -> Result<&mut Entity> {
        self.entities.get_mut(&id).ok_or(Error::UnknownEntity(id))
    }

    /// The entity a mention belongs to, via the lookup.
    #[must_use]
    pub fn entity_of(&self, mention: MentionId) -> Option<&Entity> {
        self.mention_to_entity
            .get(&mention)
            .and_then(|id| self.entities.get(id))
    }

    /// All entities, in id order.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    /// Number of registered entities.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Set the external link. Empty strings are stored as "no link".
    pub fn set_entity_link(&mut self, id: EntityId, link: Option<String>) -> Result<()> {
        self.entity_mut(id)?.link = link.filter(|l| !l.is_empty());
        Ok(())
    }

    /// Record the annotator's verdict on the canonical mention.
    pub fn set_canonical_correct(&mut self, id: EntityId, correct: bool) -> Result<()> {
        self.entity_mut(id)?.canonical_correct = Some(correct);
        Ok(())
    }

    /// Record the annotator-verified link.
    pub fn set_link_gold(&mut self, id: EntityId, link: Option<String>) -> Result<()> {
        self.entity_mut(id)?.link_gold = link.filter(|l| !l.is_empty());
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Suggestions
    // -------------------------------------------------------------------------

    /// Minimum word-level Levenshtein distance between `candidate` and any
    /// non-pronoun member of the entity.
    ///
    /// Returns `Ok(None)` when every member is a pronoun, so such clusters
    /// never anchor a suggestion.
    pub fn suggestion_score(&self, entity_id: EntityId, candidate: &str) -> Result<Option<usize>> {
        let entity = self
            .entities
            .get(&entity_id)
            .ok_or(Error::UnknownEntity(entity_id))?;
        Ok(entity
            .mentions
            .iter()
            .filter_map(|id| self.mentions.get(id))
            .filter(|m| !m.is_pronoun())
            .filter_map(|m| word_levenshtein(&m.gloss, candidate))
            .min())
    }

    /// Entities ranked by [`suggestion_score`](Self::suggestion_score), best first.
    ///
    /// Ties go to the older entity. With `max_distance`, weaker matches are dropped.
    #[must_use]
    pub fn suggest_entities(&self, candidate: &str, max_distance: Option<usize>) -> Vec<(EntityId, usize)> {
        let mut ranked: Vec<(EntityId, usize)> = self
            .entities
            .keys()
            .filter_map(|&id| {
                self.suggestion_score(id, candidate)
                    .ok()
                    .flatten()
                    .map(|score| (id, score))
            })
            .filter(|&(_, score)| max_distance.map_or(true, |max| score <= max))
            .collect();
        ranked.sort_by_key(|&(id, score)| (score, id));
        ranked
    }

    /// Merge suggestions for an existing mention, using its gloss.
    ///
    /// Pronoun mentions get no suggestions, and neither does the mention's
    /// own entity.
    pub fn suggest_for_mention(
        &self,
        mention_id: MentionId,
        max_distance: Option<usize>,
    ) -> Result<Vec<(EntityId, usize)>> {
        let mention = self
            .mention(mention_id)
            .ok_or(Error::UnknownMention(mention_id))?;
        if mention.is_pronoun() {
            return Ok(Vec::new());
        }
        let mut ranked = self.suggest_entities(&mention.gloss, max_distance);
        ranked.retain(|&(id, _)| Some(id) != mention.entity);
        Ok(ranked)
    }

    // -------------------------------------------------------------------------
    // Records
    // -------------------------------------------------------------------------

    /// Stored form of a mention, with its entity embedded.
    pub fn mention_record(&self, id: MentionId) -> Result<MentionRecord> {
        let mention = self.mention(id).ok_or(Error::UnknownMention(id))?;
        Ok(MentionRecord {
            gloss: mention.gloss.clone(),
            mention_type: mention.mention_type,
            span: mention.span,
            entity: self.entity_of(id).map(EntityRecord::from),
        })
    }

    /// Entity-phase output: every member of every entity, in entity order
    /// then join order.
    #[must_use]
    pub fn entity_annotations(&self) -> Vec<MentionRecord> {
        self.entities
            .values()
            .flat_map(|e| e.mentions.iter())
            .filter_map(|&id| self.mention_record(id).ok())
            .collect()
    }

    /// Rebuild a mention (and its entity) from a stored record.
    ///
    /// The entity is shared with any previously loaded mention whose entity
    /// has the same canonical span; otherwise it is founded anew from a
    /// canonical mention at `entity.span`.
    pub fn load_mention(&mut self, record: &MentionRecord) -> Result<MentionId> {
        let entity_id = match &record.entity {
            Some(stored) => Some(self.load_entity(stored)?),
            None => None,
        };

        let mention_id = match self.span_index.get(&record.span) {
            Some(&id) => id,
            None => self.create_mention(record.span)?,
        };

        match entity_id {
            Some(e) => {
                let current = self.mention(mention_id).and_then(|m| m.entity);
                if current != Some(e) {
                    self.add_mention(e, mention_id)?;
                }
            }
            None => {
                if let Some(ty) = record.mention_type {
                    self.set_mention_type(mention_id, ty)?;
                }
            }
        }
        Ok(mention_id)
    }

    fn load_entity(&mut self, stored: &EntityRecord) -> Result<EntityId> {
        if let Some(existing) = self.entities.values().find(|e| e.span == stored.span) {
            return Ok(existing.id);
        }
        let canonical = match self.span_index.get(&stored.span) {
            Some(&id) => id,
            None => self.create_mention(stored.span)?,
        };
        self.set_mention_type(canonical, stored.entity_type)?;
        let id = self.create_entity(canonical)?;

        let entity = self.entity_mut(id)?;
        if !stored.gloss.is_empty() {
            entity.gloss = stored.gloss.clone();
        }
        entity.link = stored.link.clone().filter(|l| !l.is_empty());
        entity.canonical_correct = stored.canonical_correct;
        entity.link_gold = stored.link_gold.clone();
        Ok(id)
    }
}
