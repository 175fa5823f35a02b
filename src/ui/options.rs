/// Options page: manage named API keys

use crate::bridge::{ChromeStorage, alert, confirm, sleep};
use crate::config::STATUS_DISPLAY_MS;
use crate::records::Credential;
use crate::storage::CredentialStore;
use crate::ui::components::StatusLine;
use crate::ui::forms::CredentialDraft;
use log::error;
use patternfly_yew::prelude::*;
use std::rc::Rc;
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlInputElement;
use yew::prelude::*;

/// Show `message` in the status line, then clear it
fn flash(status: UseStateHandle<Option<String>>, message: &str) {
    status.set(Some(message.to_string()));
    spawn_local(async move {
        sleep(STATUS_DISPLAY_MS).await;
        status.set(None);
    });
}

#[function_component(OptionsPage)]
pub fn options_page() -> Html {
    let store = use_memo((), |_| CredentialStore::new(Rc::new(ChromeStorage)));
    let credentials = use_state(Vec::<Credential>::new);
    let status = use_state(|| None::<String>);
    let load_error = use_state(|| None::<String>);
    let draft = use_state(|| None::<CredentialDraft>);

    // Load keys on mount, migrating the legacy single key if the list is empty
    {
        let store = store.clone();
        let credentials = credentials.clone();
        let load_error = load_error.clone();

        use_effect_with((), move |_| {
            spawn_local(async move {
                match store.list_or_migrate().await {
                    Ok(list) => credentials.set(list),
                    Err(e) => load_error.set(Some(format!("Failed to load: {}", e))),
                }
            });
            || ()
        });
    }

    let on_add = {
        let draft = draft.clone();
        Callback::from(move |_| {
            draft.set(Some(CredentialDraft::new()));
        })
    };

    let on_edit = {
        let store = store.clone();
        let draft = draft.clone();

        Callback::from(move |index: usize| {
            let store = store.clone();
            let draft = draft.clone();

            spawn_local(async move {
                match store.get(index).await {
                    Ok(credential) => draft.set(Some(CredentialDraft::editing(index, &credential))),
                    Err(e) => error!("Failed to load API key: {}", e),
                }
            });
        })
    };

    let on_delete = {
        let store = store.clone();
        let credentials = credentials.clone();
        let status = status.clone();

        Callback::from(move |index: usize| {
            if !confirm("Are you sure you want to delete this key?") {
                return;
            }
            let store = store.clone();
            let credentials = credentials.clone();
            let status = status.clone();

            spawn_local(async move {
                match store.remove(index).await {
                    Ok(list) => {
                        credentials.set(list);
                        flash(status, "API key deleted.");
                    }
                    Err(e) => error!("Failed to delete API key: {}", e),
                }
            });
        })
    };

    let on_save = {
        let store = store.clone();
        let credentials = credentials.clone();
        let status = status.clone();
        let draft = draft.clone();

        Callback::from(move |_| {
            let Some(current) = (*draft).clone() else {
                return;
            };
            if !current.is_complete() {
                alert("Please fill in both name and key fields.");
                return;
            }
            let store = store.clone();
            let credentials = credentials.clone();
            let status = status.clone();
            let draft = draft.clone();

            spawn_local(async move {
                match store.save(current.index, current.to_credential()).await {
                    Ok(list) => {
                        credentials.set(list);
                        draft.set(None);
                        flash(status, "API key saved.");
                    }
                    Err(e) => error!("Failed to save API key: {}", e),
                }
            });
        })
    };

    let on_cancel = {
        let draft = draft.clone();
        Callback::from(move |_| {
            draft.set(None);
        })
    };

    let on_name_input = {
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

    let on_key_input = {
        let draft = draft.clone();
        Callback::from(move |e: InputEvent| {
            if let (Some(input), Some(mut current)) =
                (e.target_dyn_into::<HtmlInputElement>(), (*draft).clone())
            {
                current.key = input.value();
                draft.set(Some(current));
            }
        })
    };

    html! {
        <div class="container">
            <div class="header">
                <h1 class="main-title">{"Gemini API Keys"}</h1>
                <Button onclick={on_add} variant={ButtonVariant::Primary}>
                    {"Add API Key"}
                </Button>
            </div>

            if let Some(err) = (*load_error).clone() {
                <Alert r#type={AlertType::Danger} title={"Error"} inline={true}>
                    {err}
                </Alert>
            }

            <StatusLine message={(*status).clone()} />

            if let Some(current) = (*draft).clone() {
                <div id="key-form-container" class="key-form">
                    <h2 id="form-title" class="form-title">{current.title()}</h2>
                    <input
                        id="key-name-input"
                        type="text"
                        placeholder="Name"
                        value={current.name.clone()}
                        oninput={on_name_input}
                        class="field-input"
                    />
                    <input
                        id="api-key-input"
                        type="password"
                        placeholder="API key"
                        value={current.key.clone()}
                        oninput={on_key_input}
                        class="field-input"
                    />
                    <div class="button-row">
                        <Button onclick={on_save}>{"Save"}</Button>
                        <Button onclick={on_cancel} variant={ButtonVariant::Secondary}>
                            {"Cancel"}
                        </Button>
                    </div>
                </div>
            }

            if credentials.is_empty() {
                <div class="empty-state">
                    <p>{"No API keys yet."}</p>
                    <p class="empty-state-hint">{"Add a key to start using the popup."}</p>
                </div>
            } else {
                <table id="api-keys-table" class="keys-table">
                    <thead>
                        <tr>
                            <th>{"Name"}</th>
                            <th>{"Key"}</th>
                            <th>{"Actions"}</th>
                        </tr>
                    </thead>
                    <tbody>
                        {for credentials.iter().enumerate().map(|(index, credential)| html! {
                            <tr>
                                <td>{&credential.name}</td>
                                <td>{credential.masked_key()}</td>
                                <td class="key-actions">
                                    <Button
                                        onclick={on_edit.reform(move |_| index)}
                                        variant={ButtonVariant::Secondary}
                                        size={ButtonSize::Small}
                                    >
                                        {"Edit"}
                                    </Button>
                                    <Button
                                        onclick={on_delete.reform(move |_| index)}
                                        variant={ButtonVariant::Danger}
                                        size={ButtonSize::Small}
                                    >
                                        {"Delete"}
                                    </Button>
                                </td>
                            </tr>
                        })}
                    </tbody>
                </table>
            }
        </div>
    }
}
