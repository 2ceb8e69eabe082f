//! Per-event tracking snapshots.

use beacon_core::{params, CustomVariables, PayloadBuilder, QueryFormat};

/// The complete parameter set of a single tracking request.
///
/// The convenience constructors cover the common tracking calls; the fields
/// are public so callers can combine them freely (a screen view carrying
/// screen-scope variables, an event with a goal conversion, and so on).
/// Identity and session fields are stamped by the tracker when the snapshot
/// is submitted.
#[derive(Debug, Clone, Default)]
pub struct EventSnapshot {
    /// Path or full URL of the tracked action. Required; paths without a
    /// scheme are resolved against the tracker's base location.
    pub path: String,
    /// Action title. Slashes create categories on the collector side.
    pub action: Option<String>,

    pub event_category: Option<String>,
    pub event_action: Option<String>,
    pub event_name: Option<String>,
    pub event_value: Option<f64>,

    pub goal_id: Option<u32>,
    pub revenue: Option<f64>,

    /// External URL the user followed.
    pub outlink: Option<String>,

    pub content_name: Option<String>,
    pub content_piece: Option<String>,
    pub content_target: Option<String>,
    pub content_interaction: Option<String>,

    /// Screen-scope custom variables attached to this action only.
    pub screen_variables: CustomVariables,

    // Stamped by Tracker::track from the session state.
    pub(crate) site_id: u32,
    pub(crate) user_id: Option<String>,
    pub(crate) visitor_id: Option<String>,
    pub(crate) api_version: u32,
    pub(crate) user_agent: Option<String>,
    pub(crate) language: Option<String>,
    pub(crate) screen_resolution: Option<String>,
    pub(crate) new_session: bool,
    pub(crate) visit_count: Option<u64>,
    pub(crate) first_visit_ts: Option<i64>,
    pub(crate) previous_visit_ts: Option<i64>,
    pub(crate) visit_variables: CustomVariables,
    pub(crate) random: u32,
}

impl EventSnapshot {
    /// A bare snapshot for the given path.
    pub fn for_path(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// A screen view with an optional action title.
    pub fn screen(path: impl Into<String>, action: Option<&str>) -> Self {
        let mut s = Self::for_path(path);
        s.action = action.map(str::to_owned);
        s
    }

    /// A custom event. Category and action are what the collector groups
    /// events by; name and value are optional refinements.
    pub fn event(
        path: impl Into<String>,
        category: &str,
        action: &str,
        name: Option<&str>,
        value: Option<f64>,
    ) -> Self {
        let mut s = Self::for_path(path);
        s.event_category = Some(category.to_owned());
        s.event_action = Some(action.to_owned());
        s.event_name = name.map(str::to_owned);
        s.event_value = value;
        s
    }

    /// A goal conversion, optionally carrying revenue.
    pub fn goal(path: impl Into<String>, goal_id: u32, revenue: Option<f64>) -> Self {
        let mut s = Self::for_path(path);
        s.goal_id = Some(goal_id);
        s.revenue = revenue;
        s
    }

    /// An outlink: the followed URL doubles as the tracked path.
    pub fn outlink(url: impl Into<String>) -> Self {
        let url = url.into();
        let mut s = Self::for_path(url.clone());
        s.outlink = Some(url);
        s
    }

    /// A content impression.
    pub fn impression(
        path: impl Into<String>,
        name: &str,
        piece: Option<&str>,
        target: Option<&str>,
    ) -> Self {
        let mut s = Self::for_path(path);
        s.content_name = Some(name.to_owned());
        s.content_piece = piece.map(str::to_owned);
        s.content_target = target.map(str::to_owned);
        s
    }

    /// An interaction with a previously shown content piece.
    pub fn interaction(
        path: impl Into<String>,
        name: &str,
        piece: Option<&str>,
        target: Option<&str>,
        interaction: &str,
    ) -> Self {
        let mut s = Self::impression(path, name, piece, target);
        s.content_interaction = Some(interaction.to_owned());
        s
    }

    /// Render the snapshot as a tracking payload.
    ///
    /// The required parameters come first (site id, url, recording flag,
    /// image suppression, cache buster), then every populated optional in a
    /// fixed order, so identical snapshots always serialize identically.
    pub(crate) fn serialize(&self, format: QueryFormat) -> String {
        let mut b = PayloadBuilder::new(format);

        b.integer(params::SITE_ID, i64::from(self.site_id))
            .string(params::URL_PATH, &self.path)
            .integer(params::RECORDING, 1)
            .integer(params::SEND_IMAGE, 0)
            .integer(params::RANDOM_NUMBER, i64::from(self.random));

        if let Some(v) = &self.action {
            b.string(params::ACTION_NAME, v);
        }
        if let Some(v) = &self.user_id {
            b.string(params::USER_ID, v);
        }
        if let Some(v) = &self.visitor_id {
            b.string(params::VISITOR_ID, v);
        }
        if self.api_version != 0 {
            b.integer(params::API_VERSION, i64::from(self.api_version));
        }
        if let Some(v) = &self.user_agent {
            b.string(params::USER_AGENT, v);
        }
        if let Some(v) = &self.language {
            b.string(params::LANGUAGE, v);
        }
        if let Some(v) = &self.screen_resolution {
            b.string(params::SCREEN_RESOLUTION, v);
        }
        if let Some(v) = &self.event_category {
            b.string(params::EVENT_CATEGORY, v);
        }
        if let Some(v) = &self.event_action {
            b.string(params::EVENT_ACTION, v);
        }
        if let Some(v) = &self.event_name {
            b.string(params::EVENT_NAME, v);
        }
        if let Some(v) = self.event_value {
            b.float(params::EVENT_VALUE, v);
        }
        if let Some(v) = self.goal_id {
            b.integer(params::GOAL_ID, i64::from(v));
        }
        if let Some(v) = self.revenue {
            b.float(params::REVENUE, v);
        }
        if let Some(v) = &self.outlink {
            b.string(params::LINK, v);
        }
        if let Some(v) = &self.content_name {
            b.string(params::CONTENT_NAME, v);
        }
        if let Some(v) = &self.content_piece {
            b.string(params::CONTENT_PIECE, v);
        }
        if let Some(v) = &self.content_target {
            b.string(params::CONTENT_TARGET, v);
        }
        if let Some(v) = &self.content_interaction {
            b.string(params::CONTENT_INTERACTION, v);
        }
        if self.new_session {
            b.integer(params::SESSION_START, 1);
        }
        if let Some(v) = self.visit_count {
            b.integer(params::VISIT_COUNT, v as i64);
        }
        if let Some(v) = self.first_visit_ts {
            b.integer(params::FIRST_VISIT_TS, v);
        }
        if let Some(v) = self.previous_visit_ts {
            b.integer(params::PREVIOUS_VISIT_TS, v);
        }
        if self.visit_variables.is_valid() {
            b.variables(params::VISIT_CUSTOM_VARIABLES, &self.visit_variables);
        }
        if self.screen_variables.is_valid() {
            b.variables(params::SCREEN_CUSTOM_VARIABLES, &self.screen_variables);
        }

        b.finish()
    }
}
