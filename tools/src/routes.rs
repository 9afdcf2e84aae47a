//! HTTP routes.

use crate::render::{self, PageContext, Tab};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use fraudscope_core::{
    glossary::{self, GlossaryEntry},
    pipeline::Dashboard,
    recommendations::{catalog, RecommendationCard},
    session::SessionState,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone)]
pub struct AppState {
    pub dashboard: Arc<Dashboard>,
    pub session: Arc<RwLock<SessionState>>,
    pub logo_src: Arc<str>,
}

impl AppState {
    pub fn new(dashboard: Dashboard, logo_src: String) -> Self {
        Self {
            dashboard: Arc::new(dashboard),
            session: Arc::new(RwLock::new(SessionState::default())),
            logo_src: logo_src.into(),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/select/:key", post(select))
        .route("/healthz", get(healthz))
        .route("/api/summary", get(api_summary))
        .route("/api/recommendations", get(api_recommendations))
        .route("/api/glossary/:field", get(api_glossary))
        .with_state(state)
}

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub tab: Option<String>,
    pub field: Option<String>,
}

async fn index(State(state): State<AppState>, Query(q): Query<PageQuery>) -> Html<String> {
    let selected = state.session.read().await.selected_rule;
    Html(render::page(&PageContext {
        dashboard: &state.dashboard,
        selected,
        tab: Tab::from_slug(q.tab.as_deref()),
        field: q.field.as_deref(),
        logo_src: &state.logo_src,
    }))
}

/// Chart-side navigation. A known key becomes the selection and lands on
/// the recommendations tab; anything else leaves the state alone.
async fn select(State(state): State<AppState>, Path(key): Path<String>) -> Redirect {
    let applied = state.session.write().await.select_rule(&key);
    if applied {
        Redirect::to(&format!("/?tab={}", Tab::Recommendations.slug()))
    } else {
        log::warn!("ignored selection of unknown rule {key:?}");
        Redirect::to("/")
    }
}

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Serialize)]
struct Summary<'a> {
    date_range_note: String,
    #[serde(flatten)]
    dashboard: &'a Dashboard,
}

async fn api_summary(State(state): State<AppState>) -> Response {
    Json(Summary {
        date_range_note: state.dashboard.date_range_note(),
        dashboard: &state.dashboard,
    })
    .into_response()
}

async fn api_recommendations(State(state): State<AppState>) -> Json<Vec<RecommendationCard>> {
    let selected = state.session.read().await.selected_rule;
    Json(catalog(selected))
}

async fn api_glossary(Path(field): Path<String>) -> Result<Json<&'static GlossaryEntry>, StatusCode> {
    glossary::lookup(&field).map(Json).ok_or(StatusCode::NOT_FOUND)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fraudscope_core::{config::AnalysisConfig, loader::RawTable, recommendations::RuleKey};

    fn state() -> AppState {
        let mut raw = RawTable::new(vec!["DELIVERY_ID".to_string()]);
        raw.push_row([Some("d1")]);
        let dash = Dashboard::from_raw(&raw, &AnalysisConfig::default()).unwrap();
        AppState::new(dash, String::new())
    }

    #[tokio::test]
    async fn known_key_selects_and_redirects_to_recs() {
        let st = state();
        let resp = select(State(st.clone()), Path("device".into())).await.into_response();
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(resp.headers()["location"], "/?tab=recs");
        assert_eq!(st.session.read().await.selected_rule, Some(RuleKey::Device));
    }

    #[tokio::test]
    async fn unknown_key_leaves_selection_unchanged() {
        let st = state();
        st.session.write().await.select_rule("sift");
        let _ = select(State(st.clone()), Path("bogus".into())).await;
        assert_eq!(st.session.read().await.selected_rule, Some(RuleKey::Sift));
    }

    #[tokio::test]
    async fn recommendations_follow_selection() {
        let st = state();
        st.session.write().await.select_rule("platform");
        let Json(cards) = api_recommendations(State(st)).await;
        assert_eq!(cards[0].rule.key, RuleKey::Platform);
        assert!(cards[0].highlighted);
    }

    #[tokio::test]
    async fn glossary_api_misses_are_404() {
        assert!(api_glossary(Path("GOV".into())).await.is_ok());
        assert_eq!(
            api_glossary(Path("NOPE".into())).await.err(),
            Some(StatusCode::NOT_FOUND)
        );
    }

    #[tokio::test]
    async fn healthz_is_ok() {
        assert_eq!(healthz().await, "ok");
    }

    #[test]
    fn summary_serializes_flat() {
        let st = state();
        let value = serde_json::to_value(Summary {
            date_range_note: st.dashboard.date_range_note(),
            dashboard: &st.dashboard,
        })
        .unwrap();
        assert_eq!(value["date_range_note"], "Data range: —");
        assert_eq!(value["aggregates"]["kpis"]["deliveries"], 1);
    }
}
