//! HTML form and result page

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Form,
};
use chrono::Local;
use tracing::debug;

use crate::{profile_error_message, views, AppError, AppState};
use subsidy_core::{CompanyProfile, ProfileField, SearchSession, SessionView};

/// Number inputs the form must not submit blank
const REQUIRED_NUMBERS: [(ProfileField, &str); 2] = [
    (ProfileField::AnnualElectricityBill, "年平均電費為必填"),
    (ProfileField::EstimatedBudget, "預計投入預算為必填"),
];

/// GET / - Empty form with defaults and the initial panel
pub async fn index() -> Html<String> {
    Html(views::render_page(
        &CompanyProfile::default(),
        &SessionView::Initial,
        None,
    ))
}

/// POST /search - Submit the form and render the page with results
///
/// Each submission is its own session: the page is rendered only after the
/// search has finished, so there is never a stale response to discard.
pub async fn form_search(
    State(state): State<Arc<AppState>>,
    Form(fields): Form<Vec<(String, String)>>,
) -> Response {
    let mut profile = CompanyProfile::default();
    for (name, value) in &fields {
        match profile.set_field_by_name(name, value) {
            Ok(next) => profile = next,
            Err(e) => return rejected(&profile, &profile_error_message(&e)),
        }
    }

    if let Err(e) = profile.validate() {
        return rejected(&profile, &profile_error_message(&e));
    }

    // A cleared number input submits "", which would otherwise coerce to 0
    for (field, message) in REQUIRED_NUMBERS {
        let filled = fields.iter().any(|(name, value)| {
            name.parse::<ProfileField>().is_ok_and(|f| f == field) && !value.trim().is_empty()
        });
        if !filled {
            return rejected(&profile, message);
        }
    }

    let mut session = SearchSession::with_profile(profile);
    let ticket = session.begin_search();
    let outcome = state.matcher.find_subsidies(&ticket.profile).await;
    let status = match &outcome {
        Ok(_) => StatusCode::OK,
        Err(e) => AppError::search(e).status(),
    };
    session.complete(&ticket, outcome);

    let view = session.view();
    debug!(status = %status, "Rendered search page");

    (
        status,
        Html(views::render_page(
            session.profile(),
            &view,
            Some(Local::now()),
        )),
    )
        .into_response()
}

fn rejected(profile: &CompanyProfile, message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Html(views::render_page(
            profile,
            &SessionView::Failed {
                message: message.to_string(),
            },
            None,
        )),
    )
        .into_response()
}
