/// Reusable UI components

use patternfly_yew::prelude::Spinner;
use web_sys::HtmlSelectElement;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct IndexSelectProps {
    pub id: AttrValue,
    pub label: AttrValue,
    pub options: Vec<String>,
    pub selected: Option<usize>,
    pub onchange: Callback<Option<usize>>,
    #[prop_or(false)]
    pub disabled: bool,
}

/// `<select>` over a list whose option values are positions in that list
#[function_component(IndexSelect)]
pub fn index_select(props: &IndexSelectProps) -> Html {
    let onchange = {
        let callback = props.onchange.clone();
        Callback::from(move |e: Event| {
            if let Some(select) = e.target_dyn_into::<HtmlSelectElement>() {
                callback.emit(select.value().parse::<usize>().ok());
            }
        })
    };

    html! {
        <div class="field">
            <label for={props.id.clone()} class="field-label">{props.label.clone()}</label>
            <select
                id={props.id.clone()}
                class="field-select"
                disabled={props.disabled}
                {onchange}
            >
                {for props.options.iter().enumerate().map(|(index, label)| html! {
                    <option value={index.to_string()} selected={props.selected == Some(index)}>
                        {label}
                    </option>
                })}
            </select>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct OutputPanelProps {
    pub text: AttrValue,
    #[prop_or(false)]
    pub busy: bool,
}

#[function_component(OutputPanel)]
pub fn output_panel(props: &OutputPanelProps) -> Html {
    html! {
        <div class="output-container">
            if props.busy {
                <div class="loading-text-center">
                    <Spinner />
                </div>
            }
            <pre id="output" class="output-text">{props.text.clone()}</pre>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct StatusLineProps {
    #[prop_or_default]
    pub message: Option<String>,
}

#[function_component(StatusLine)]
pub fn status_line(props: &StatusLineProps) -> Html {
    html! {
        <p id="status" class="status-line">
            {props.message.clone().unwrap_or_default()}
        </p>
    }
}
