//! DOM construction for the job forms, plus the page-level spinner and the
//! transient notification box. Every rendered input is recorded in an
//! explicit, ordered binding list at creation time; extraction always walks
//! that list, never the markup.

use gloo_timers::callback::Timeout;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, HtmlInputElement};

use crate::env::{self, PageEnv};
use crate::models::{FieldSpec, Job, NoticeLevel, Task};
use crate::settings::FormField;

const NOTICE_DISMISS_MS: u32 = 6_000;

pub fn web_document() -> Option<Document> {
    web_sys::window().and_then(|window| window.document())
}

#[derive(Debug, Clone)]
pub enum BindingKind {
    Marker,
    Text { param: String },
    Checkbox { param: String },
}

/// One rendered control, captured when the card was built. Order in the
/// binding list mirrors the visual order: a marker per task card, then that
/// task's fields.
pub struct FieldBinding {
    pub kind: BindingKind,
    pub input: HtmlInputElement,
}

impl FieldBinding {
    pub fn snapshot(&self) -> FormField {
        match &self.kind {
            BindingKind::Marker => FormField::Marker,
            BindingKind::Text { param } => FormField::Text {
                name: param.clone(),
                value: self.input.value(),
            },
            BindingKind::Checkbox { param } => FormField::Checkbox {
                name: param.clone(),
                checked: self.input.checked(),
            },
        }
    }
}

pub struct JobCard {
    pub root: Element,
    pub trigger_button: Element,
    pub restore_button: Element,
    pub bindings: Vec<FieldBinding>,
}

pub fn build_job_card(doc: &Document, page_env: &PageEnv, job: &Job) -> Option<JobCard> {
    let root = doc.create_element("div").ok()?;
    root.set_class_name("card");

    let header = doc.create_element("div").ok()?;
    header.set_class_name("card-header");
    let badge = doc.create_element("span").ok()?;
    badge.set_class_name("badge badge-secondary");
    badge.set_text_content(Some(&job.job_name));
    let _ = header.append_child(&badge);

    // Task list starts collapsed; the header click toggles it.
    let body = doc
        .create_element("div")
        .ok()?
        .dyn_into::<HtmlElement>()
        .ok()?;
    body.set_class_name("card-body");
    let _ = body.style().set_property("display", "none");

    let mut bindings = Vec::new();
    for task in &job.sub_tasks {
        if let Some(card) = build_task_card(doc, page_env, task, &mut bindings) {
            let _ = body.append_child(&card);
        }
    }

    let footer = doc.create_element("div").ok()?;
    footer.set_class_name("card-footer");
    let trigger_button = doc.create_element("div").ok()?;
    trigger_button.set_class_name("btn btn-success btn-sm");
    trigger_button.set_text_content(Some("Trigger Job"));
    let restore_button = doc.create_element("div").ok()?;
    restore_button.set_class_name("btn btn-primary btn-sm");
    restore_button.set_text_content(Some("Restore Defaults"));
    let _ = footer.append_child(&trigger_button);
    let _ = footer.append_child(&restore_button);

    install_body_toggle(&header, body.clone());

    let _ = root.append_child(&header);
    let _ = root.append_child(&body);
    let _ = root.append_child(&footer);

    Some(JobCard {
        root,
        trigger_button,
        restore_button,
        bindings,
    })
}

fn build_task_card(
    doc: &Document,
    page_env: &PageEnv,
    task: &Task,
    bindings: &mut Vec<FieldBinding>,
) -> Option<Element> {
    let card = doc.create_element("div").ok()?;
    card.set_class_name("task-card");

    let title = doc.create_element("h4").ok()?;
    let badge = doc.create_element("span").ok()?;
    badge.set_class_name("badge badge-secondary");
    badge.set_text_content(Some(&task.use_module));
    let _ = title.append_child(&badge);
    let _ = card.append_child(&title);

    let marker = doc
        .create_element("input")
        .ok()?
        .dyn_into::<HtmlInputElement>()
        .ok()?;
    marker.set_type("hidden");
    marker.set_name("use_module");
    marker.set_value(&task.use_module);
    let _ = card.append_child(&marker);
    bindings.push(FieldBinding {
        kind: BindingKind::Marker,
        input: marker,
    });

    for field in &task.gui_config {
        match field {
            FieldSpec::Text {
                param,
                label,
                default,
                ..
            } => {
                if let Some((group, input)) = build_text_input(doc, page_env, param, label, default)
                {
                    let _ = card.append_child(&group);
                    bindings.push(FieldBinding {
                        kind: BindingKind::Text {
                            param: param.clone(),
                        },
                        input,
                    });
                }
            }
            FieldSpec::Checkbox {
                param,
                label,
                default,
                ..
            } => {
                if let Some((group, input)) = build_checkbox_input(doc, param, label, *default) {
                    let _ = card.append_child(&group);
                    bindings.push(FieldBinding {
                        kind: BindingKind::Checkbox {
                            param: param.clone(),
                        },
                        input,
                    });
                }
            }
        }
    }

    Some(card)
}

fn build_text_input(
    doc: &Document,
    page_env: &PageEnv,
    param: &str,
    label: &str,
    default: &str,
) -> Option<(Element, HtmlInputElement)> {
    let group = doc.create_element("div").ok()?;
    group.set_class_name("form-group");

    let caption = doc.create_element("label").ok()?;
    caption.set_text_content(Some(&format!("{label} :")));
    if env::needs_prefix(param, page_env) {
        let hint = doc.create_element("strong").ok()?;
        hint.set_text_content(Some(&format!(
            " (Will be prefixed by '{}-')",
            page_env.user_name
        )));
        let _ = caption.append_child(&hint);
    }

    let input = doc
        .create_element("input")
        .ok()?
        .dyn_into::<HtmlInputElement>()
        .ok()?;
    input.set_type("text");
    input.set_class_name("form-control");
    input.set_name(param);
    input.set_value(default);

    let _ = group.append_child(&caption);
    let _ = group.append_child(&input);
    Some((group, input))
}

fn build_checkbox_input(
    doc: &Document,
    param: &str,
    label: &str,
    default: bool,
) -> Option<(Element, HtmlInputElement)> {
    let group = doc.create_element("div").ok()?;
    group.set_class_name("form-group");

    let caption = doc.create_element("label").ok()?;
    caption.set_text_content(Some(&format!("{label} :")));

    let input = doc
        .create_element("input")
        .ok()?
        .dyn_into::<HtmlInputElement>()
        .ok()?;
    input.set_type("checkbox");
    input.set_name(param);
    input.set_value("1");
    input.set_checked(default);

    let _ = group.append_child(&caption);
    let _ = group.append_child(&input);
    Some((group, input))
}

fn install_body_toggle(header: &Element, body: HtmlElement) {
    let callback = Closure::<dyn FnMut(web_sys::Event)>::new(move |_event: web_sys::Event| {
        let hidden = body
            .style()
            .get_property_value("display")
            .map(|value| value == "none")
            .unwrap_or(false);
        let _ = body
            .style()
            .set_property("display", if hidden { "block" } else { "none" });
    });
    let _ = header.add_event_listener_with_callback("click", callback.as_ref().unchecked_ref());
    callback.forget();
}

/// Pushes a job's current model values back into its rendered inputs, used
/// after restore-defaults. Walks the binding list the same way the
/// extractor does: markers advance the task slot, fields look up their
/// param in the current task.
pub fn refresh_fields(job: &Job, bindings: &[FieldBinding]) {
    let mut task_index: Option<usize> = None;
    for binding in bindings {
        match &binding.kind {
            BindingKind::Marker => {
                task_index = Some(task_index.map_or(0, |index| index + 1));
            }
            BindingKind::Text { param } => {
                if let Some(FieldSpec::Text { default, .. }) = field_at(job, task_index, param) {
                    binding.input.set_value(default);
                }
            }
            BindingKind::Checkbox { param } => {
                if let Some(FieldSpec::Checkbox { default, .. }) = field_at(job, task_index, param)
                {
                    binding.input.set_checked(*default);
                }
            }
        }
    }
}

fn field_at<'a>(job: &'a Job, task_index: Option<usize>, param: &str) -> Option<&'a FieldSpec> {
    job.sub_tasks
        .get(task_index?)?
        .gui_config
        .iter()
        .find(|field| field.param() == param)
}

pub fn hide_spinner() {
    let Some(spinner) = web_document()
        .and_then(|doc| doc.get_element_by_id("spinner"))
        .and_then(|node| node.dyn_into::<HtmlElement>().ok())
    else {
        return;
    };
    let _ = spinner.style().set_property("display", "none");
}

/// Shows a transient message in the notification box; auto-dismissed after
/// a few seconds.
pub fn show_notice(level: NoticeLevel, message: &str) {
    let Some(node) = notice_box() else {
        return;
    };
    node.set_text_content(Some(message));
    node.set_class_name(&format!("notice {}", level.as_class()));
    let _ = node.style().set_property("display", "block");

    let shown = message.to_string();
    let dismiss = Timeout::new(NOTICE_DISMISS_MS, move || {
        let Some(node) = notice_box() else {
            return;
        };
        // A newer notice may have replaced this one; leave it alone.
        if node.text_content().as_deref() == Some(shown.as_str()) {
            let _ = node.style().set_property("display", "none");
        }
    });
    dismiss.forget();
}

fn notice_box() -> Option<HtmlElement> {
    web_document()
        .and_then(|doc| doc.get_element_by_id("notice-box"))
        .and_then(|node| node.dyn_into::<HtmlElement>().ok())
}
