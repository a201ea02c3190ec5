use crate::Parameters;
use crate::Plugin;
use crate::PluginContext;
use crate::SidebarError;
use crate::SidebarResult;

const DEFAULT_FORMAT: &str = "* {{ s.title }}\n";

/// Lists submissions from a subreddit listing, one rendered line each.
///
/// | parameter               | default              |
/// | ----------------------- | -------------------- |
/// | `submissions_subreddit` | required             |
/// | `submissions_count`     | `5`                  |
/// | `submissions_listing`   | `hot`                |
/// | `submission_format`     | `* {{ s.title }}\n`  |
///
/// `submission_format` is a minijinja template with the submission bound to
/// `s`. A literal `\n` in the config value becomes a newline.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubmissionsPlugin;

impl Plugin for SubmissionsPlugin {
	fn name(&self) -> &str {
		"submissions"
	}

	fn run(&self, ctx: &PluginContext<'_>, parameters: &Parameters) -> SidebarResult<String> {
		let subreddit = parameters.require("submissions_subreddit")?;
		let count: usize = parameters.parse_or("submissions_count", 5)?;
		let listing = parameters.get_or("submissions_listing", "hot");
		let format = parameters
			.get_or("submission_format", DEFAULT_FORMAT)
			.replace("\\n", "\n");

		let mut env = minijinja::Environment::new();
		env.set_keep_trailing_newline(true);
		env.add_template("submission", &format)
			.map_err(|e| SidebarError::plugin(self.name(), e))?;
		let template = env
			.get_template("submission")
			.map_err(|e| SidebarError::plugin(self.name(), e))?;

		let submissions = ctx.session.submissions(subreddit, listing, count)?;
		tracing::debug!(subreddit, listing, count = submissions.len(), "Fetched submissions");

		let mut output = String::new();
		for submission in &submissions {
			let line = template
				.render(minijinja::context! { s => submission })
				.map_err(|e| SidebarError::plugin(self.name(), e))?;
			output.push_str(&line);
		}

		Ok(output)
	}
}
