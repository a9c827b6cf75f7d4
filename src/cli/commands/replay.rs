//! Replay command - drive the annotation workflow from a script
//!
//! The action file is a JSON array, applied in order:
//!
//! ```json
//! [ {"action": "choose", "relation": "per:employee_or_member_of"},
//!   {"action": "back"},
//!   {"action": "edit", "pair": 0},
//!   {"action": "canonical", "correct": true},
//!   {"action": "link", "link": "wiki:Acme_Corp"},
//!   {"action": "link"} ]
//! ```
//!
//! A `link` action without a link dismisses the lookup.

use clap::Parser;
use serde::Deserialize;

use super::super::output::{to_json, write_output};
use super::super::utils::{load_config, load_session, read_json};
use super::InputArgs;
use crate::pairs::{load_mention_pairs, MentionPairGenerator, MentionPairRecord, PairId};
use crate::workflow::{AnnotationWorkflow, LinkResolution, WorkflowEvent, WorkflowState};

/// Replay scripted annotator actions and print the resulting relations
#[derive(Parser, Debug)]
pub struct ReplayArgs {
    /// Document, mentions and config
    #[command(flatten)]
    pub input: InputArgs,

    /// Action script JSON
    #[arg(short, long, value_name = "PATH")]
    pub actions: String,

    /// Use a stored pair list instead of generating candidates
    #[arg(long, value_name = "PATH")]
    pub pairs: Option<String>,

    /// Write the relations to a file instead of stdout
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<String>,
}

/// One scripted annotator action
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum Action {
    /// Label the presented pair
    Choose {
        /// Relation name
        relation: String,
    },
    /// Re-label an earlier pair
    Edit {
        /// Pair id
        pair: PairId,
    },
    /// Re-label the previous pair
    Back,
    /// Answer a canonical-mention check
    Canonical {
        /// Whether the mention refers to the canonical entity
        correct: bool,
    },
    /// Answer a link lookup; no link means dismissed
    Link {
        /// Resolved link
        #[serde(default)]
        link: Option<String>,
    },
}

/// Run the replay command
pub fn run(args: ReplayArgs) -> Result<(), String> {
    let config = load_config(&args.input)?;
    let mut session = load_session(&args.input)?;
    let actions: Vec<Action> = read_json(&args.actions, "action script")?;

    let pairs = match &args.pairs {
        Some(path) => {
            let records: Vec<MentionPairRecord> = read_json(path, "pair list")?;
            load_mention_pairs(&mut session, &records).map_err(|e| e.to_string())?
        }
        None => MentionPairGenerator::new(&config).generate(&session),
    };

    let mut workflow = AnnotationWorkflow::new(pairs, &config);
    workflow.on_event(|event| match event {
        WorkflowEvent::Presenting { pair } => log::debug!("presenting pair {}", pair),
        WorkflowEvent::RelationRecorded { pair, relation } => {
            log::info!("pair {}: recorded {}", pair, relation)
        }
        WorkflowEvent::RelationRetracted { pair, relation } => {
            log::info!("pair {}: retracted {}", pair, relation)
        }
        WorkflowEvent::VerificationRequested(request) => log::debug!("awaiting {:?}", request),
        WorkflowEvent::Done => log::debug!("queue exhausted"),
    });
    workflow.start().map_err(|e| e.to_string())?;

    for (step, action) in actions.iter().enumerate() {
        let result = match action {
            Action::Choose { relation } => workflow.choose(&mut session, relation),
            Action::Edit { pair } => workflow.edit_previous(*pair),
            Action::Back => workflow.go_back(),
            Action::Canonical { correct } => workflow.answer_canonical(&mut session, *correct),
            Action::Link { link } => {
                let resolution = match link {
                    Some(link) => LinkResolution::Resolved(link.clone()),
                    None => LinkResolution::Dismissed,
                };
                workflow.answer_link(&mut session, resolution)
            }
        };
        result.map_err(|e| format!("action {} ({:?}): {}", step, action, e))?;
    }

    if workflow.state() != WorkflowState::Done {
        return Err(format!(
            "script ended before the workflow finished (state {:?})",
            workflow.state()
        ));
    }
    let relations = workflow.finalize(&session).map_err(|e| e.to_string())?;
    write_output(&to_json(&relations)?, args.output.as_deref())
}
