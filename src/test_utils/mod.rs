#![allow(missing_docs)]

pub(crate) mod db;
pub(crate) mod form;
pub(crate) mod html;
pub(crate) mod http;

pub(crate) use db::{create_test_account, create_test_category, get_test_connection};
pub(crate) use form::{
    assert_form_error_message, assert_form_input, assert_form_submit_button, assert_hx_endpoint,
    form_select_values, must_get_form, must_get_hx_form,
};
pub(crate) use html::{
    assert_valid_html, parse_html_document, parse_html_fragment, select_attr, select_text,
};
pub(crate) use http::{assert_hx_redirect, get_header};
