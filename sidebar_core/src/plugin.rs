use std::collections::BTreeMap;
use std::collections::HashMap;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::str::FromStr;

use chrono::DateTime;
use chrono::Utc;
use derive_more::Deref;
use derive_more::DerefMut;

use crate::Session;
use crate::SidebarError;
use crate::SidebarResult;
use crate::plugins::CountdownPlugin;
use crate::plugins::SubmissionsPlugin;

/// String parameters forwarded from a region's config section to its plugin.
///
/// All values are strings. Plugins parse numbers and flags themselves and
/// fall back to documented defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deref, DerefMut)]
pub struct Parameters(
	#[deref]
	#[deref_mut]
	BTreeMap<String, String>,
);

impl Parameters {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn get(&self, key: &str) -> Option<&str> {
		self.0.get(key).map(String::as_str)
	}

	/// The value for `key`, or an error naming the missing parameter.
	pub fn require(&self, key: &str) -> SidebarResult<&str> {
		self.get(key)
			.ok_or_else(|| SidebarError::MissingParameter(key.to_string()))
	}

	pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
		self.get(key).unwrap_or(default)
	}

	/// Parse the value for `key`, falling back to `default` when absent.
	/// A present value that fails to parse is an error.
	pub fn parse_or<T>(&self, key: &str, default: T) -> SidebarResult<T>
	where
		T: FromStr,
		T::Err: fmt::Display,
	{
		let Some(value) = self.get(key) else {
			return Ok(default);
		};

		value.trim().parse().map_err(|e: T::Err| {
			SidebarError::InvalidParameter {
				key: key.to_string(),
				value: value.to_string(),
				reason: e.to_string(),
			}
		})
	}

	pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.0.insert(key.into(), value.into());
		self
	}
}

impl From<BTreeMap<String, String>> for Parameters {
	fn from(map: BTreeMap<String, String>) -> Self {
		Self(map)
	}
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Parameters {
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		Self(
			iter.into_iter()
				.map(|(key, value)| (key.into(), value.into()))
				.collect(),
		)
	}
}

/// Shared state handed to every plugin during one pass.
#[derive(Clone, Copy)]
pub struct PluginContext<'a> {
	/// The subreddit whose sidebar is being synchronized.
	pub subreddit: &'a str,
	/// Timestamp taken once at the start of the pass.
	pub now: DateTime<Utc>,
	/// Access to the remote service.
	pub session: &'a dyn Session,
}

impl fmt::Debug for PluginContext<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("PluginContext")
			.field("subreddit", &self.subreddit)
			.field("now", &self.now)
			.field("session", &self.session.label())
			.finish()
	}
}

/// A unit of content generation invoked once per region per pass.
///
/// Plugins only return text; they never touch the document.
pub trait Plugin {
	/// Name used in the `plugin` key of a region.
	fn name(&self) -> &str;

	fn run(&self, ctx: &PluginContext<'_>, parameters: &Parameters) -> SidebarResult<String>;
}

/// Adapter that lets a closure act as a [`Plugin`].
pub struct FnPlugin<F> {
	name: String,
	run: F,
}

impl<F> FnPlugin<F>
where
	F: Fn(&PluginContext<'_>, &Parameters) -> SidebarResult<String>,
{
	pub fn new(name: impl Into<String>, run: F) -> Self {
		Self {
			name: name.into(),
			run,
		}
	}
}

impl<F> Plugin for FnPlugin<F>
where
	F: Fn(&PluginContext<'_>, &Parameters) -> SidebarResult<String>,
{
	fn name(&self) -> &str {
		&self.name
	}

	fn run(&self, ctx: &PluginContext<'_>, parameters: &Parameters) -> SidebarResult<String> {
		(self.run)(ctx, parameters)
	}
}

/// Maps plugin names to their implementations. Populated once at startup.
#[derive(Default)]
pub struct PluginRegistry {
	plugins: HashMap<String, Box<dyn Plugin>>,
}

impl PluginRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// A registry holding `countdown` and `submissions`.
	pub fn with_builtins() -> Self {
		let mut registry = Self::new();
		registry
			.register(CountdownPlugin)
			.register(SubmissionsPlugin);
		registry
	}

	/// Register a plugin under its own name, replacing any previous plugin
	/// with that name.
	pub fn register(&mut self, plugin: impl Plugin + 'static) -> &mut Self {
		self.plugins
			.insert(plugin.name().to_string(), Box::new(plugin));
		self
	}

	pub fn register_fn<F>(&mut self, name: impl Into<String>, run: F) -> &mut Self
	where
		F: Fn(&PluginContext<'_>, &Parameters) -> SidebarResult<String> + 'static,
	{
		self.register(FnPlugin::new(name, run))
	}

	pub fn resolve(&self, name: &str) -> SidebarResult<&dyn Plugin> {
		self.plugins
			.get(name)
			.map(Box::as_ref)
			.ok_or_else(|| SidebarError::PluginNotFound(name.to_string()))
	}

	pub fn contains(&self, name: &str) -> bool {
		self.plugins.contains_key(name)
	}

	/// Registered plugin names, sorted.
	pub fn names(&self) -> Vec<&str> {
		let mut names: Vec<&str> = self.plugins.keys().map(String::as_str).collect();
		names.sort_unstable();
		names
	}

	/// Resolve `name` and run it. A panic inside the plugin is reported as a
	/// plugin failure rather than unwinding into the caller.
	pub fn invoke(
		&self,
		name: &str,
		ctx: &PluginContext<'_>,
		parameters: &Parameters,
	) -> SidebarResult<String> {
		let plugin = self.resolve(name)?;
		tracing::debug!(plugin = name, ?parameters, "Run plugin");

		let output = std::panic::catch_unwind(AssertUnwindSafe(|| plugin.run(ctx, parameters)))
			.map_err(|payload| SidebarError::plugin(name, panic_message(payload.as_ref())))??;

		tracing::debug!(plugin = name, %output, "Plugin output");
		Ok(output)
	}
}

impl fmt::Debug for PluginRegistry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("PluginRegistry")
			.field("plugins", &self.names())
			.finish()
	}
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
	if let Some(message) = payload.downcast_ref::<&str>() {
		format!("panicked: {message}")
	} else if let Some(message) = payload.downcast_ref::<String>() {
		format!("panicked: {message}")
	} else {
		"panicked".to_string()
	}
}
