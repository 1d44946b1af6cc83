//! Expansion of appointment definitions into calendar instances.
//!
//! Expansion is a pure function of its input: no I/O and no clock reads. The
//! result is rebuilt from scratch on every call, so callers re-run it whenever
//! their definition set changes and replace the previous output wholesale.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, warn};
use uuid::Uuid;

use crate::appointment::{AppointmentDefinition, AppointmentInstance, AppointmentRecord};
use crate::config::BookingConfig;
use crate::error::{BookingError, BookingResult};
use crate::recurrence::date_sequence;

/// Source of ids for generated occurrences.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> String;
}

/// Random 128-bit ids
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidV4;

impl IdGenerator for UuidV4 {
    fn next_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Deterministic ids (`<prefix>-1`, `<prefix>-2`, ...), for reproducible output.
#[derive(Debug)]
pub struct SequentialIds {
    prefix: String,
    counter: AtomicU64,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        SequentialIds {
            prefix: prefix.into(),
            counter: AtomicU64::new(0),
        }
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{}-{}", self.prefix, n)
    }
}

/// A problem with one definition, reported alongside the instances of the rest.
#[derive(Debug)]
pub struct ExpansionIssue {
    pub definition_id: String,
    pub error: BookingError,
}

/// Result of expanding a set of definitions.
#[derive(Debug, Default)]
pub struct Expansion {
    /// Grouped by definition in input order, ascending dates within a group
    pub instances: Vec<AppointmentInstance>,
    pub issues: Vec<ExpansionIssue>,
}

impl Expansion {
    pub fn has_fatal_issues(&self) -> bool {
        self.issues.iter().any(|issue| issue.error.is_fatal())
    }

    fn report(&mut self, definition_id: &str, error: BookingError) {
        warn!(definition = definition_id, %error, "Problem expanding appointment");
        self.issues.push(ExpansionIssue {
            definition_id: definition_id.to_string(),
            error,
        });
    }
}

/// Expands recurring appointment definitions into dated instances.
#[derive(Clone)]
pub struct Expander {
    max_occurrences: usize,
    ids: Arc<dyn IdGenerator>,
}

impl Default for Expander {
    fn default() -> Self {
        Expander::new(&BookingConfig::default())
    }
}

impl Expander {
    pub fn new(config: &BookingConfig) -> Self {
        Expander::with_id_generator(config, UuidV4)
    }

    pub fn with_id_generator(config: &BookingConfig, ids: impl IdGenerator + 'static) -> Self {
        Expander {
            max_occurrences: config.max_occurrences,
            ids: Arc::new(ids),
        }
    }

    /// Expand every definition, skipping (and reporting) the ones that fail.
    pub fn expand(&self, definitions: &[AppointmentDefinition]) -> Expansion {
        let mut expansion = Expansion::default();

        for definition in definitions {
            self.expand_into(definition, &mut expansion);
        }

        expansion
    }

    /// Parse and expand records as the UI stores them.
    ///
    /// Records that fail to parse are reported and contribute no instances.
    pub fn expand_records(&self, records: &[AppointmentRecord]) -> Expansion {
        let mut expansion = Expansion::default();

        for record in records {
            match AppointmentDefinition::try_from(record) {
                Ok(definition) => self.expand_into(&definition, &mut expansion),
                Err(error) => expansion.report(&record.id, error),
            }
        }

        expansion
    }

    /// All-or-nothing expansion: the first fatal error aborts the whole call.
    pub fn try_expand(
        &self,
        definitions: &[AppointmentDefinition],
    ) -> BookingResult<Vec<AppointmentInstance>> {
        let mut instances = Vec::new();

        for definition in definitions {
            instances.extend(self.expand_one(definition)?);
        }

        Ok(instances)
    }

    /// Expand a single definition into its instances.
    pub fn expand_one(
        &self,
        definition: &AppointmentDefinition,
    ) -> BookingResult<Vec<AppointmentInstance>> {
        let Some(end) = definition.expansion_end() else {
            return Ok(vec![AppointmentInstance::anchor(definition)]);
        };

        let dates = date_sequence(
            definition.date,
            definition.frequency,
            end,
            self.max_occurrences,
        )?;

        debug!(
            definition = %definition.id,
            frequency = %definition.frequency,
            %end,
            occurrences = dates.len(),
            "Expanded recurring appointment"
        );

        let instances = dates
            .into_iter()
            .enumerate()
            .map(|(index, date)| {
                if index == 0 {
                    AppointmentInstance::anchor(definition)
                } else {
                    AppointmentInstance::occurrence(definition, self.ids.next_id(), date)
                }
            })
            .collect();

        Ok(instances)
    }

    fn expand_into(&self, definition: &AppointmentDefinition, expansion: &mut Expansion) {
        match self.expand_one(definition) {
            Ok(instances) => {
                if let Some(end) = definition
                    .expansion_end()
                    .filter(|end| *end < definition.date)
                {
                    expansion.report(
                        &definition.id,
                        BookingError::InvalidRange {
                            anchor: definition.date,
                            end,
                        },
                    );
                }
                expansion.instances.extend(instances);
            }
            Err(error) => expansion.report(&definition.id, error),
        }
    }
}

/// Expand `definitions` with the default configuration and random ids.
pub fn expand(definitions: &[AppointmentDefinition]) -> Expansion {
    Expander::default().expand(definitions)
}
