//! The controller: one-directional flow from schema fetch through merge to
//! render, with user actions (trigger, restore defaults) operating on the
//! explicit application state instead of ambient page state.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::Element;
use tracing::{info, warn};

use crate::api;
use crate::env::PageEnv;
use crate::models::{Job, NoticeLevel};
use crate::settings::{self, FormField, SettingsCookie};
use crate::ui::{self, FieldBinding};

pub struct AppState {
    pub env: PageEnv,
    pub jobs: Vec<Job>,
    /// One panel per job, same order as `jobs`.
    pub panels: Vec<JobPanel>,
}

pub struct JobPanel {
    pub bindings: Vec<FieldBinding>,
}

pub type App = Rc<RefCell<AppState>>;

/// Page boot: fetch the schema, overlay the cached settings, render. The
/// spinner is hidden exactly once whether the fetch succeeds or fails.
pub fn boot() {
    let app: App = Rc::new(RefCell::new(AppState {
        env: PageEnv::from_globals(),
        jobs: Vec::new(),
        panels: Vec::new(),
    }));

    spawn_local(async move {
        let uri_base = app.borrow().env.uri_base.clone();
        match api::fetch_jobs(&uri_base).await {
            Ok(mut jobs) => {
                let cookie = SettingsCookie::load();
                for job in &mut jobs {
                    if let Some(slots) = cookie.get(&job.job_name) {
                        settings::apply_overrides(job, slots);
                    }
                }
                info!(jobs = jobs.len(), "job configuration loaded");
                app.borrow_mut().jobs = jobs;
                render(&app);
            }
            Err(err) => {
                warn!("failed to load job configuration: {err}");
                ui::show_notice(
                    NoticeLevel::Error,
                    &format!("Failed to load job configuration: {err}"),
                );
            }
        }
        ui::hide_spinner();
    });
}

fn render(app: &App) {
    let Some(doc) = ui::web_document() else {
        return;
    };
    let Some(container) = doc.get_element_by_id("job-list") else {
        warn!("job-list container missing; nothing to render");
        return;
    };
    container.set_inner_html("");

    let mut panels = Vec::new();
    {
        let state = app.borrow();
        for (index, job) in state.jobs.iter().enumerate() {
            let Some(card) = ui::build_job_card(&doc, &state.env, job) else {
                continue;
            };
            install_click_handler(app, index, &card.trigger_button, trigger_job);
            install_click_handler(app, index, &card.restore_button, restore_defaults);
            let _ = container.append_child(&card.root);
            panels.push(JobPanel {
                bindings: card.bindings,
            });
        }
    }
    app.borrow_mut().panels = panels;
}

fn install_click_handler(app: &App, index: usize, button: &Element, action: fn(&App, usize)) {
    let app = app.clone();
    let callback = Closure::<dyn FnMut(web_sys::Event)>::new(move |_event: web_sys::Event| {
        action(&app, index);
    });
    let _ = button.add_event_listener_with_callback("click", callback.as_ref().unchecked_ref());
    callback.forget();
}

/// Extract -> persist -> POST -> notify. Extraction and the cookie write
/// happen synchronously on the click; only the POST is awaited.
fn trigger_job(app: &App, index: usize) {
    let (uri_base, job_name, slots) = {
        let state = app.borrow();
        let Some(job) = state.jobs.get(index) else {
            return;
        };
        let Some(panel) = state.panels.get(index) else {
            return;
        };
        let fields: Vec<FormField> = panel.bindings.iter().map(FieldBinding::snapshot).collect();
        (
            state.env.uri_base.clone(),
            job.job_name.clone(),
            settings::collect_task_slots(&fields),
        )
    };

    SettingsCookie::save_job(&job_name, slots.clone());

    spawn_local(async move {
        match api::trigger_job(&uri_base, &job_name, &slots).await {
            Ok(outcome) => {
                let message = if outcome.msg.is_empty() {
                    outcome.state.clone()
                } else {
                    outcome.msg.clone()
                };
                ui::show_notice(
                    NoticeLevel::from_state(&outcome.state),
                    &format!("{job_name}: {message}"),
                );
            }
            Err(err) => {
                warn!(job = %job_name, "trigger failed: {err}");
                ui::show_notice(
                    NoticeLevel::Error,
                    &format!("Triggering {job_name} failed: {err}"),
                );
            }
        }
    });
}

/// Resets every field of the job to its server default, pushes the values
/// back into the rendered inputs and re-persists the cookie so it matches
/// the restored form.
fn restore_defaults(app: &App, index: usize) {
    let (job_name, slots) = {
        let mut state = app.borrow_mut();
        let AppState { jobs, panels, .. } = &mut *state;
        let Some(job) = jobs.get_mut(index) else {
            return;
        };
        let Some(panel) = panels.get(index) else {
            return;
        };

        settings::restore_defaults(job);
        ui::refresh_fields(job, &panel.bindings);

        let fields: Vec<FormField> = panel.bindings.iter().map(FieldBinding::snapshot).collect();
        (job.job_name.clone(), settings::collect_task_slots(&fields))
    };
    SettingsCookie::save_job(&job_name, slots);
}
