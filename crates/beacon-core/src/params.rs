//! Tracking parameter names understood by the collector HTTP API.
//!
//! Every tracking request is a flat set of `name=value` pairs; the constants
//! here are the names the collector assigns meaning to. Parameters are grouped
//! the way the collector documentation groups them.

// Required parameters

/// The ID of the website the visit/action is recorded for.
pub const SITE_ID: &str = "idsite";

/// Must be set to 1 for the request to be recorded at all.
pub const RECORDING: &str = "rec";

/// The full URL of the current action.
pub const URL_PATH: &str = "url";

// Recommended parameters

/// The title of the action being tracked. Slashes create categories,
/// e.g. `Help / Feedback` files the action `Feedback` under `Help`.
pub const ACTION_NAME: &str = "action_name";

/// The unique visitor ID: a 16-character hexadecimal string that must not
/// change once assigned to a visitor.
pub const VISITOR_ID: &str = "_id";

/// A random value regenerated for each request so that caches and proxies
/// never swallow a tracking hit.
pub const RANDOM_NUMBER: &str = "rand";

/// The tracking API version in use (currently always 1).
pub const API_VERSION: &str = "apiv";

// Optional visit info

/// Visit-scope custom variables, JSON encoded.
pub const VISIT_CUSTOM_VARIABLES: &str = "_cvar";

/// The running count of visits for this visitor.
pub const VISIT_COUNT: &str = "_idvc";

/// UNIX timestamp of this visitor's previous visit.
pub const PREVIOUS_VISIT_TS: &str = "_viewts";

/// UNIX timestamp of this visitor's first visit.
pub const FIRST_VISIT_TS: &str = "_idts";

/// Override value for the User-Agent header.
pub const USER_AGENT: &str = "ua";

/// Override value for the Accept-Language header.
pub const LANGUAGE: &str = "lang";

/// Screen resolution of the device, e.g. `1280x1024`.
pub const SCREEN_RESOLUTION: &str = "res";

/// The User ID: any non-empty string uniquely identifying the user.
pub const USER_ID: &str = "uid";

/// Set to 1 to force a new visit for this action.
pub const SESSION_START: &str = "new_visit";

// Optional action info

/// Page-scope custom variables, JSON encoded.
pub const SCREEN_CUSTOM_VARIABLES: &str = "cvar";

/// An external URL the user has opened (outlink tracking).
pub const LINK: &str = "link";

/// Goal ID to trigger a conversion for.
pub const GOAL_ID: &str = "idgoal";

/// Monetary revenue generated by the goal conversion.
pub const REVENUE: &str = "revenue";

/// The event category (e.g. Videos, Music, Games).
pub const EVENT_CATEGORY: &str = "e_c";

/// The event action (e.g. Play, Pause, Clicked).
pub const EVENT_ACTION: &str = "e_a";

/// The event name (e.g. a movie or song name).
pub const EVENT_NAME: &str = "e_n";

/// The event value; must be numeric.
pub const EVENT_VALUE: &str = "e_v";

/// Content name for impression tracking, e.g. `Ad Foo Bar`.
pub const CONTENT_NAME: &str = "c_n";

/// The actual content piece (image path, video, text).
pub const CONTENT_PIECE: &str = "c_p";

/// The content target, e.g. the URL of a landing page.
pub const CONTENT_TARGET: &str = "c_t";

/// The name of the interaction with the content, e.g. `click`.
pub const CONTENT_INTERACTION: &str = "c_i";

// Other parameters

/// Set to 0 to receive an HTTP 204 instead of a GIF image.
pub const SEND_IMAGE: &str = "send_image";
