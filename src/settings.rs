//! The settings core: the persisted per-job override mapping, the merge of
//! cached overrides onto a freshly fetched schema, and the extraction of the
//! live form back into that mapping.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::cookie;
use crate::models::{value_truthy, FieldSpec, Job};

/// The single cookie key everything is persisted under.
pub const SETTINGS_COOKIE: &str = "kanku_job";

/// Per-task `param -> value` overrides, positionally aligned with
/// `Job::sub_tasks`.
pub type TaskOverrides = Map<String, Value>;

/// The whole persisted mapping: `job_name -> override slots`.
///
/// Read-modify-written on every save without any cross-tab coordination;
/// two near-simultaneous saves are last-write-wins. Acceptable for the
/// single-user, single-tab use this page is built for.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SettingsCookie {
    jobs: BTreeMap<String, Vec<TaskOverrides>>,
}

impl SettingsCookie {
    /// Decodes the raw cookie payload. Absent, empty or malformed payloads
    /// all come back as the empty mapping; a broken cookie must never take
    /// the page down.
    pub fn decode(raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
            return Self::default();
        };
        match serde_json::from_str(raw) {
            Ok(jobs) => Self { jobs },
            Err(err) => {
                debug!("discarding malformed settings cookie: {err}");
                Self::default()
            }
        }
    }

    pub fn encode(&self) -> String {
        serde_json::to_string(&self.jobs).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn get(&self, job_name: &str) -> Option<&[TaskOverrides]> {
        self.jobs.get(job_name).map(Vec::as_slice)
    }

    pub fn set(&mut self, job_name: &str, slots: Vec<TaskOverrides>) {
        self.jobs.insert(job_name.to_string(), slots);
    }

    /// Reads the browser cookie jar.
    pub fn load() -> Self {
        Self::decode(cookie::get(SETTINGS_COOKIE).as_deref())
    }

    /// Overwrites one job's entry and writes the whole mapping back.
    pub fn save_job(job_name: &str, slots: Vec<TaskOverrides>) {
        let mut all = Self::load();
        all.set(job_name, slots);
        cookie::set(SETTINGS_COOKIE, &all.encode());
    }
}

/// Overlays cached override slots onto a freshly fetched job schema.
///
/// Slot `i` applies to `sub_tasks[i]`; slots beyond the current task list
/// and params with no matching field are skipped, since the schema may have
/// evolved since the cookie was written. The first application of a cached
/// value captures the server default into `original_default`; a field whose
/// `original_default` is already set is left alone, which also makes the
/// merge idempotent within one page load.
pub fn apply_overrides(job: &mut Job, slots: &[TaskOverrides]) {
    for (index, slot) in slots.iter().enumerate() {
        let Some(task) = job.sub_tasks.get_mut(index) else {
            debug!(
                job = %job.job_name,
                index,
                "cached slot has no matching task; skipping"
            );
            continue;
        };
        for (param, value) in slot {
            let Some(field) = task
                .gui_config
                .iter_mut()
                .find(|field| field.param() == param)
            else {
                continue;
            };
            override_field(field, value);
        }
    }
}

fn override_field(field: &mut FieldSpec, value: &Value) {
    if value.is_null() {
        return;
    }
    match field {
        FieldSpec::Text {
            default,
            original_default,
            ..
        } => {
            let Some(text) = override_text(value) else {
                return;
            };
            if original_default.is_none() {
                *original_default = Some(std::mem::replace(default, text));
            }
        }
        FieldSpec::Checkbox {
            default,
            original_default,
            ..
        } => {
            if original_default.is_none() {
                *original_default = Some(std::mem::replace(default, value_truthy(value)));
            }
        }
    }
}

fn override_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

/// Resets every overridden field back to the server-supplied value.
/// `original_default` is retained, so restoring is idempotent and a later
/// merge in the same page load cannot clobber the pristine value.
pub fn restore_defaults(job: &mut Job) {
    for task in &mut job.sub_tasks {
        for field in &mut task.gui_config {
            match field {
                FieldSpec::Text {
                    default,
                    original_default,
                    ..
                } => {
                    if let Some(original) = original_default {
                        *default = original.clone();
                    }
                }
                FieldSpec::Checkbox {
                    default,
                    original_default,
                    ..
                } => {
                    if let Some(original) = original_default {
                        *default = *original;
                    }
                }
            }
        }
    }
}

/// A snapshot of one rendered form control, taken from the explicit binding
/// list captured at render time (never inferred from markup order).
#[derive(Debug, Clone, PartialEq)]
pub enum FormField {
    /// The hidden `use_module` input that opens a task card.
    Marker,
    Text { name: String, value: String },
    Checkbox { name: String, checked: bool },
}

/// Groups an ordered field snapshot into per-task override slots.
///
/// Each marker opens a new empty slot; the fields that follow land in it.
/// Fields arriving before the first marker have no task to belong to and
/// are dropped.
pub fn collect_task_slots(fields: &[FormField]) -> Vec<TaskOverrides> {
    let mut slots: Vec<TaskOverrides> = Vec::new();
    for field in fields {
        match field {
            FormField::Marker => slots.push(TaskOverrides::new()),
            FormField::Text { name, value } => match slots.last_mut() {
                Some(slot) => {
                    slot.insert(name.clone(), Value::String(value.clone()));
                }
                None => warn!(field = %name, "form field precedes the first task marker; dropped"),
            },
            FormField::Checkbox { name, checked } => match slots.last_mut() {
                Some(slot) => {
                    slot.insert(name.clone(), Value::Bool(*checked));
                }
                None => warn!(field = %name, "form field precedes the first task marker; dropped"),
            },
        }
    }
    slots
}
