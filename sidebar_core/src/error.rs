use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum SidebarError {
	#[error(transparent)]
	#[diagnostic(code(sidebar::io_error))]
	Io(#[from] std::io::Error),

	#[error("failed to parse region config: {0}")]
	#[diagnostic(
		code(sidebar::config_parse),
		help("the region config is an INI file with one `[section]` per region")
	)]
	ConfigParse(String),

	#[error("region `{region}` is missing required key `{key}`")]
	#[diagnostic(
		code(sidebar::missing_key),
		help("every region needs `marker_start`, `marker_end` and `plugin`")
	)]
	MissingKey { region: String, key: String },

	#[error("region `{region}` has an empty `{key}`")]
	#[diagnostic(
		code(sidebar::empty_marker),
		help("markers must contain text so the region can be located again")
	)]
	EmptyMarker { region: String, key: String },

	#[error("region `{0}` is declared more than once")]
	#[diagnostic(
		code(sidebar::duplicate_region),
		help("each `[section]` title must be unique within the config")
	)]
	DuplicateRegion(String),

	#[error("key `{key}` is set more than once in `[{region}]`")]
	#[diagnostic(
		code(sidebar::duplicate_key),
		help("remove the extra `{key}` line; keys are compared case-insensitively")
	)]
	DuplicateKey { region: String, key: String },

	#[error("no plugin named `{0}` is registered")]
	#[diagnostic(
		code(sidebar::plugin_not_found),
		help("built-in plugins are `countdown` and `submissions`")
	)]
	PluginNotFound(String),

	#[error("plugin `{plugin}` failed: {reason}")]
	#[diagnostic(code(sidebar::plugin_failed))]
	PluginFailed { plugin: String, reason: String },

	#[error("missing required parameter `{0}`")]
	#[diagnostic(
		code(sidebar::missing_parameter),
		help("add `{0} = ...` to the region's section")
	)]
	MissingParameter(String),

	#[error("invalid value `{value}` for parameter `{key}`: {reason}")]
	#[diagnostic(code(sidebar::invalid_parameter))]
	InvalidParameter {
		key: String,
		value: String,
		reason: String,
	},

	#[error("document store error: {0}")]
	#[diagnostic(code(sidebar::store))]
	Store(String),
}

impl SidebarError {
	/// Shorthand for a plugin failure carrying a displayable reason.
	pub fn plugin(plugin: impl Into<String>, reason: impl std::fmt::Display) -> Self {
		Self::PluginFailed {
			plugin: plugin.into(),
			reason: reason.to_string(),
		}
	}
}

pub type SidebarResult<T> = Result<T, SidebarError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;
