use scraper::{ElementRef, Html, Selector};

fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|error| panic!("invalid selector {css:?}: {error}"))
}

/// The first form in the page.
#[track_caller]
pub(crate) fn must_get_form(html: &Html) -> ElementRef<'_> {
    html.select(&selector("form"))
        .next()
        .expect("want a form in the page")
}

/// The first form that submits through htmx with `attribute`, e.g. "hx-post".
///
/// Pages like the budgets page also carry plain GET forms for picking a
/// period, which [must_get_form] would return first.
#[track_caller]
pub(crate) fn must_get_hx_form<'a>(html: &'a Html, attribute: &str) -> ElementRef<'a> {
    html.select(&selector(&format!("form[{attribute}]")))
        .next()
        .unwrap_or_else(|| panic!("want a form with the {attribute} attribute"))
}

#[track_caller]
pub(crate) fn assert_hx_endpoint(form: &ElementRef<'_>, endpoint: &str, attribute: &str) {
    let got = form
        .value()
        .attr(attribute)
        .unwrap_or_else(|| panic!("want form with attribute {attribute}, got none"));

    assert_eq!(
        got, endpoint,
        "want form with {attribute}=\"{endpoint}\", got {got:?}"
    );
}

/// Amount, name and date fields are required inputs of the given type.
#[track_caller]
pub(crate) fn assert_form_input(form: &ElementRef<'_>, name: &str, type_: &str) {
    let input = form
        .select(&selector(&format!("input[name=\"{name}\"]")))
        .next()
        .unwrap_or_else(|| panic!("want an input named {name:?}"));

    let got_type = input.value().attr("type").unwrap_or_default();
    assert_eq!(
        got_type, type_,
        "want input {name:?} with type {type_:?}, got {got_type:?}"
    );
    assert!(
        input.value().attr("required").is_some(),
        "want input {name:?} to be required"
    );
}

/// Returns the non-empty option values of the select named `name`.
///
/// The empty value is the "choose an account/category" placeholder.
#[track_caller]
pub(crate) fn form_select_values(form: &ElementRef<'_>, name: &str) -> Vec<String> {
    let select = form
        .select(&selector(&format!("select[name=\"{name}\"]")))
        .next()
        .unwrap_or_else(|| panic!("want a select named {name:?}"));

    select
        .select(&selector("option"))
        .filter_map(|option| option.value().attr("value"))
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
        .collect()
}

#[track_caller]
pub(crate) fn assert_form_submit_button(form: &ElementRef<'_>) {
    let button = form
        .select(&selector("button"))
        .next()
        .expect("want a button in the form");

    assert_eq!(
        button.value().attr("type").unwrap_or_default(),
        "submit",
        "want the form's button to have type=\"submit\""
    );
}

/// The inline error shown under the log-in email field.
#[track_caller]
pub(crate) fn assert_form_error_message(form: &ElementRef<'_>, want: &str) {
    let got = form
        .select(&selector("p"))
        .next()
        .expect("want an error message in the form")
        .text()
        .collect::<String>();

    assert_eq!(got.trim(), want);
}
