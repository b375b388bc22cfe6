//! ==============================================================================
//! dashboard.rs - GET / markup
//! ==============================================================================
//!
//! the dashboard is a static page compiled into the binary. it polls
//! /api/registros every 2s and renders values with textContent, so tag
//! data sent by a device is never interpreted as html.
//!
//! ==============================================================================

use axum::response::Html;

const DASHBOARD_HTML: &str = include_str!("../assets/dashboard.html");

pub async fn dashboard_handler() -> Html<&'static str> {
    Html(DASHBOARD_HTML)
}
