use chrono::DateTime;
use chrono::FixedOffset;
use chrono::NaiveDate;
use chrono::NaiveDateTime;
use chrono::TimeZone;
use chrono::Utc;
use chrono_tz::Tz;

use crate::Parameters;
use crate::Plugin;
use crate::PluginContext;
use crate::SidebarError;
use crate::SidebarResult;

const DATE_TIME_FORMATS: [&str; 4] = [
	"%Y-%m-%d %H:%M:%S",
	"%Y-%m-%d %H:%M",
	"%Y-%m-%dT%H:%M:%S",
	"%Y-%m-%dT%H:%M",
];

const UNKNOWN_TIMEZONE: &str =
	"expected a zone name like `America/New_York` or an offset like `+02:00`";

const UNITS: [(&str, u64); 5] = [
	("year", 365 * 24 * 60 * 60),
	("day", 24 * 60 * 60),
	("hour", 60 * 60),
	("minute", 60),
	("second", 1),
];

/// Renders the time between now and `countdown_date` in words.
///
/// | parameter             | default  |
/// | --------------------- | -------- |
/// | `countdown_date`      | required |
/// | `countdown_timezone`  | required |
/// | `countdown_future`    | `{0}`    |
/// | `countdown_past`      | `{0}`    |
/// | `countdown_precision` | `2`      |
///
/// `countdown_timezone` is an IANA zone name or a fixed offset.
/// `{0}` in the future/past template is replaced with the humanized delta,
/// e.g. `Kickoff in {0}` becomes `Kickoff in 42 days`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CountdownPlugin;

impl Plugin for CountdownPlugin {
	fn name(&self) -> &str {
		"countdown"
	}

	fn run(&self, ctx: &PluginContext<'_>, parameters: &Parameters) -> SidebarResult<String> {
		let date = parameters.require("countdown_date")?;
		let timezone = parameters.require("countdown_timezone")?;
		let future = parameters.get_or("countdown_future", "{0}");
		let past = parameters.get_or("countdown_past", "{0}");
		let precision: usize = parameters.parse_or("countdown_precision", 2)?;

		let then = parse_local(date, timezone)?;
		let delta = ctx.now.signed_duration_since(then).num_seconds();
		tracing::info!(
			countdown_date = date,
			countdown_timezone = timezone,
			precision,
			delta,
			"Running countdown"
		);

		let human = humanize(delta.unsigned_abs(), precision);
		let template = if delta < 0 { future } else { past };

		Ok(template.replace("{0}", &human).replace("{}", &human))
	}
}

/// Parse a naive date or date-time in `timezone` and convert it to UTC.
///
/// `timezone` is an IANA name such as `America/New_York` or `US/Eastern`
/// (daylight saving time included), or anything [`parse_offset`] accepts.
pub fn parse_local(date: &str, timezone: &str) -> SidebarResult<DateTime<Utc>> {
	let date = date.trim();
	let naive = DATE_TIME_FORMATS
		.iter()
		.find_map(|format| NaiveDateTime::parse_from_str(date, format).ok())
		.or_else(|| {
			NaiveDate::parse_from_str(date, "%Y-%m-%d")
				.ok()
				.and_then(|day| day.and_hms_opt(0, 0, 0))
		})
		.ok_or_else(|| {
			SidebarError::InvalidParameter {
				key: "countdown_date".to_string(),
				value: date.to_string(),
				reason: "expected `YYYY-MM-DD` optionally followed by `HH:MM[:SS]`".to_string(),
			}
		})?;

	let local = match timezone.trim().parse::<Tz>() {
		Ok(zone) => localize(&zone, &naive),
		Err(_) => localize(&parse_offset(timezone)?, &naive),
	};

	local.ok_or_else(|| {
		SidebarError::InvalidParameter {
			key: "countdown_date".to_string(),
			value: date.to_string(),
			reason: "not representable in the given timezone".to_string(),
		}
	})
}

// Wall times repeated when clocks go back resolve to standard time.
fn localize<Z: TimeZone>(zone: &Z, naive: &NaiveDateTime) -> Option<DateTime<Utc>> {
	zone.from_local_datetime(naive)
		.latest()
		.map(|local| local.with_timezone(&Utc))
}

/// Parse `UTC`, `Z`, `GMT`, or a fixed offset such as `+02:00`, `-0500`,
/// `UTC-4`.
pub fn parse_offset(timezone: &str) -> SidebarResult<FixedOffset> {
	let invalid = |reason: &str| {
		SidebarError::InvalidParameter {
			key: "countdown_timezone".to_string(),
			value: timezone.to_string(),
			reason: reason.to_string(),
		}
	};

	let trimmed = timezone.trim();
	let upper = trimmed.to_ascii_uppercase();
	let rest = upper
		.strip_prefix("UTC")
		.or_else(|| upper.strip_prefix("GMT"))
		.unwrap_or(&upper);

	if rest.is_empty() || rest == "Z" {
		return FixedOffset::east_opt(0).ok_or_else(|| invalid("out of range"));
	}

	let (sign, digits) = if let Some(digits) = rest.strip_prefix('+') {
		(1, digits)
	} else if let Some(digits) = rest.strip_prefix('-') {
		(-1, digits)
	} else {
		return Err(invalid(UNKNOWN_TIMEZONE));
	};

	if !digits.is_ascii() {
		return Err(invalid(UNKNOWN_TIMEZONE));
	}

	let (hours, minutes) = match digits.split_once(':') {
		Some((hours, minutes)) => (hours, minutes),
		None if digits.len() > 2 => digits.split_at(digits.len() - 2),
		None => (digits, "0"),
	};

	let hours: i32 = hours.parse().map_err(|_| invalid("hours are not a number"))?;
	let minutes: i32 = minutes
		.parse()
		.map_err(|_| invalid("minutes are not a number"))?;
	if hours > 23 || minutes > 59 {
		return Err(invalid("out of range"));
	}

	FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(|| invalid("out of range"))
}

/// Spell out a duration using at most `precision` non-zero units, largest
/// first: `humanize(90_061, 2)` is `1 day, 1 hour`.
pub fn humanize(seconds: u64, precision: usize) -> String {
	let precision = precision.max(1);
	let mut remaining = seconds;
	let mut parts = Vec::with_capacity(precision);

	for (unit, size) in UNITS {
		let count = remaining / size;
		remaining %= size;

		if count == 0 {
			continue;
		}

		let plural = if count == 1 { "" } else { "s" };
		parts.push(format!("{count} {unit}{plural}"));

		if parts.len() == precision {
			break;
		}
	}

	if parts.is_empty() {
		return "0 seconds".to_string();
	}

	parts.join(", ")
}
