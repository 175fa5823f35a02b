/// Popup UI for Gemini Web Companion

use crate::bridge::{ChromeBrowser, ChromeStorage, alert, confirm};
use crate::config::ApiConfig;
use crate::error::ExtensionError;
use crate::gemini::{ModelDescriptor, ReqwestClient};
use crate::orchestrator::{Orchestrator, PROCESSING_MESSAGE, SessionState};
use crate::records::{Credential, Prompt};
use crate::ui::components::{IndexSelect, OutputPanel};
use crate::ui::forms::PromptDraft;
use log::error;
use patternfly_yew::prelude::*;
use std::rc::Rc;
use wasm_bindgen_futures::spawn_local;
use web_sys::{HtmlInputElement, HtmlTextAreaElement};
use yew::prelude::*;

#[derive(Debug, Clone, PartialEq)]
enum PopupView {
    Loading,
    MissingCredential,
    Ready,
    Error(String),
}

/// View for a loaded credential list: the controls need at least one key
fn view_for(credentials: &[Credential]) -> PopupView {
    if credentials.is_empty() {
        PopupView::MissingCredential
    } else {
        PopupView::Ready
    }
}

fn build_controller() -> Orchestrator {
    Orchestrator::with_http(
        Rc::new(ChromeStorage),
        Rc::new(ChromeBrowser),
        Rc::new(ReqwestClient::new()),
        ApiConfig::default(),
    )
}

/// Copy the controller's session into render state
fn sync(controller: &Orchestrator, session: &UseStateHandle<SessionState>) {
    session.set(controller.session().clone());
}

async fn refresh_models(
    controller: &Orchestrator,
    credential: Credential,
    models: &UseStateHandle<Vec<ModelDescriptor>>,
) {
    models.set(Vec::new());
    // Failures are already rendered into the session output
    if let Ok(fetched) = controller.select_credential(credential).await {
        models.set(fetched);
    }
}

async fn refresh_prompts(controller: &Orchestrator, prompts: &UseStateHandle<Vec<Prompt>>) {
    match controller.reload_prompts().await {
        Ok(list) => prompts.set(list),
        Err(e) => error!("Failed to load prompts: {}", e),
    }
}

#[function_component(App)]
pub fn app() -> Html {
    let controller = use_memo((), |_| build_controller());
    let view = use_state(|| PopupView::Loading);
    let session = use_state(SessionState::default);
    let credentials = use_state(Vec::<Credential>::new);
    let models = use_state(Vec::<ModelDescriptor>::new);
    let prompts = use_state(Vec::<Prompt>::new);
    let processing = use_state(|| false);
    let draft = use_state(|| None::<PromptDraft>);

    // Load credentials, models and prompts on mount
    {
        let controller = controller.clone();
        let view = view.clone();
        let session = session.clone();
        let credentials = credentials.clone();
        let models = models.clone();
        let prompts = prompts.clone();

        use_effect_with((), move |_| {
            spawn_local(async move {
                match controller.load_credentials().await {
                    Ok(list) => {
                        view.set(view_for(&list));
                        let first = list.first().cloned();
                        credentials.set(list);
                        if let Some(first) = first {
                            refresh_models(&controller, first, &models).await;
                        }
                    }
                    Err(e) => view.set(PopupView::Error(e.to_string())),
                }
                refresh_prompts(&controller, &prompts).await;
                sync(&controller, &session);
            });
            || ()
        });
    }

    let on_credential_change = {
        let controller = controller.clone();
        let session = session.clone();
        let credentials = credentials.clone();
        let models = models.clone();

        Callback::from(move |index: Option<usize>| {
            let Some(credential) = index.and_then(|i| credentials.get(i).cloned()) else {
                return;
            };
            let controller = controller.clone();
            let session = session.clone();
            let models = models.clone();

            spawn_local(async move {
                refresh_models(&controller, credential, &models).await;
                sync(&controller, &session);
            });
        })
    };

    let on_model_change = {
        let controller = controller.clone();
        let session = session.clone();
        let models = models.clone();

        Callback::from(move |index: Option<usize>| {
            controller.select_model(index.and_then(|i| models.get(i)).map(|m| m.name.clone()));
            sync(&controller, &session);
        })
    };

    let on_prompt_change = {
        let controller = controller.clone();
        let session = session.clone();

        Callback::from(move |index: Option<usize>| {
            controller.select_prompt(index);
            sync(&controller, &session);
        })
    };

    let on_process = {
        let controller = controller.clone();
        let session = session.clone();
        let processing = processing.clone();

        Callback::from(move |_| {
            let controller = controller.clone();
            let session = session.clone();
            let processing = processing.clone();

            processing.set(true);
            spawn_local(async move {
                controller.process_page().await;
                sync(&controller, &session);
                processing.set(false);
            });
        })
    };

    let on_screenshot = {
        let controller = controller.clone();
        let session = session.clone();

        Callback::from(move |_| {
            let controller = controller.clone();
            let session = session.clone();

            spawn_local(async move {
                if let Err(e) = controller.capture_screenshot().await {
                    error!("Screenshot failed: {}", e);
                }
                sync(&controller, &session);
            });
        })
    };

    let on_download = {
        let controller = controller.clone();

        Callback::from(move |_| {
            let controller = controller.clone();

            spawn_local(async move {
                match controller.export().await {
                    Ok(_) => {}
                    Err(e @ ExtensionError::NothingToExport) => alert(&e.to_string()),
                    Err(e) => {
                        error!("Export failed: {}", e);
                        alert(&e.user_message());
                    }
                }
            });
        })
    };

    let on_new_prompt = {
        let draft = draft.clone();
        Callback::from(move |_| {
            draft.set(Some(PromptDraft::new()));
        })
    };

    let on_edit_prompt = {
        let controller = controller.clone();
        let session = session.clone();
        let draft = draft.clone();

        Callback::from(move |_| {
            let Some(index) = session.prompt_index else {
                alert("Please select a prompt to edit.");
                return;
            };
            let controller = controller.clone();
            let draft = draft.clone();

            spawn_local(async move {
                match controller.prompts().get(index).await {
                    Ok(prompt) => draft.set(Some(PromptDraft::editing(index, &prompt))),
                    Err(e) => error!("Failed to load prompt: {}", e),
                }
            });
        })
    };

    let on_delete_prompt = {
        let controller = controller.clone();
        let session = session.clone();
        let prompts = prompts.clone();

        Callback::from(move |_| {
            let Some(index) = session.prompt_index else {
                alert("Please select a prompt to delete.");
                return;
            };
            if !confirm("Are you sure you want to delete this prompt?") {
                return;
            }
            let controller = controller.clone();
            let session = session.clone();
            let prompts = prompts.clone();

            spawn_local(async move {
                if let Err(e) = controller.prompts().remove(index).await {
                    error!("Failed to delete prompt: {}", e);
                }
                refresh_prompts(&controller, &prompts).await;
                sync(&controller, &session);
            });
        })
    };

    let on_save_prompt = {
        let controller = controller.clone();
        let session = session.clone();
        let prompts = prompts.clone();
        let draft = draft.clone();

        Callback::from(move |_| {
            let Some(current) = (*draft).clone() else {
                return;
            };
            if !current.is_complete() {
                return;
            }
            let controller = controller.clone();
            let session = session.clone();
            let prompts = prompts.clone();
            let draft = draft.clone();

            spawn_local(async move {
                match controller.prompts().save(current.index, current.to_prompt()).await {
                    Ok(_) => draft.set(None),
                    Err(e) => error!("Failed to save prompt: {}", e),
                }
                refresh_prompts(&controller, &prompts).await;
                sync(&controller, &session);
            });
        })
    };

    let on_cancel_prompt = {
        let draft = draft.clone();
        Callback::from(move |_| {
            draft.set(None);
        })
    };

    let on_prompt_name_input = {
        let draft = draft.clone();
        Callback::from(move |e: InputEvent| {
            if let (Some(input), Some(mut current)) =
                (e.target_dyn_into::<HtmlInputElement>(), (*draft).clone())
            {
                current.name = input.value();
                draft.set(Some(current));
            }
        })
    };

    let on_prompt_text_input = {
        let draft = draft.clone();
        Callback::from(move |e: InputEvent| {
            if let (Some(input), Some(mut current)) =
                (e.target_dyn_into::<HtmlTextAreaElement>(), (*draft).clone())
            {
                current.text = input.value();
                draft.set(Some(current));
            }
        })
    };

    let selected_credential = session
        .credential
        .as_ref()
        .and_then(|c| credentials.iter().position(|known| known == c));
    let selected_model = session
        .model
        .as_ref()
        .and_then(|name| models.iter().position(|m| &m.name == name));
    let output = if *processing {
        PROCESSING_MESSAGE.to_string()
    } else {
        session.output.clone()
    };

    html! {
        <div class="padding-20">
            <h1 class="popup-title">{"Gemini Web Companion"}</h1>

            {match &*view {
                PopupView::Loading => html! {
                    <div class="loading-text-center">
                        <Spinner />
                    </div>
                },
                PopupView::MissingCredential => html! {
                    <div id="api-key-message" class="message-top-margin">
                        <Alert r#type={AlertType::Warning} title={"No API key"} inline={true}>
                            {"Please add a Gemini API key in the extension options."}
                        </Alert>
                    </div>
                },
                PopupView::Error(err) => html! {
                    <div class="message-top-margin">
                        <Alert r#type={AlertType::Danger} title={"Error"} inline={true}>
                            {err.clone()}
                        </Alert>
                    </div>
                },
                PopupView::Ready => html! {
                    <div id="main-content" class="flex-column-gap">
                        <IndexSelect
                            id="api-key-select"
                            label="API key"
                            options={credentials.iter().map(|c| c.name.clone()).collect::<Vec<_>>()}
                            selected={selected_credential}
                            onchange={on_credential_change}
                        />
                        <IndexSelect
                            id="model-select"
                            label="Model"
                            options={models.iter().map(|m| m.display_name.clone()).collect::<Vec<_>>()}
                            selected={selected_model}
                            onchange={on_model_change}
                        />
                        <IndexSelect
                            id="prompt-select"
                            label="Prompt"
                            options={prompts.iter().map(|p| p.name.clone()).collect::<Vec<_>>()}
                            selected={session.prompt_index}
                            onchange={on_prompt_change}
                        />

                        <div class="button-row">
                            <Button onclick={on_new_prompt} variant={ButtonVariant::Secondary}>
                                {"New"}
                            </Button>
                            <Button onclick={on_edit_prompt} variant={ButtonVariant::Secondary}>
                                {"Edit"}
                            </Button>
                            <Button onclick={on_delete_prompt} variant={ButtonVariant::Danger}>
                                {"Delete"}
                            </Button>
                        </div>

                        if let Some(current) = (*draft).clone() {
                            <div id="new-prompt-container" class="prompt-form">
                                <input
                                    id="prompt-name"
                                    type="text"
                                    placeholder="Prompt name"
                                    value={current.name.clone()}
                                    oninput={on_prompt_name_input}
                                    class="field-input"
                                />
                                <textarea
                                    id="prompt-text"
                                    placeholder="Prompt text"
                                    value={current.text.clone()}
                                    oninput={on_prompt_text_input}
                                    class="field-textarea"
                                />
                                <div class="button-row">
                                    <Button onclick={on_save_prompt}>
                                        {current.submit_label()}
                                    </Button>
                                    <Button onclick={on_cancel_prompt} variant={ButtonVariant::Secondary}>
                                        {"Cancel"}
                                    </Button>
                                </div>
                            </div>
                        }

                        <Button onclick={on_process} disabled={*processing} block={true}>
                            {"Process Page"}
                        </Button>
                        <div class="button-row">
                            <Button onclick={on_screenshot} variant={ButtonVariant::Secondary}>
                                {"Capture Screenshot"}
                            </Button>
                            <Button onclick={on_download} variant={ButtonVariant::Secondary}>
                                {"Download Results"}
                            </Button>
                        </div>

                        <OutputPanel text={output} busy={*processing} />
                    </div>
                },
            }}

            <p class="footer-popup">
                {"Gemini Web Companion v0.1.0"}
            </p>
        </div>
    }
}
