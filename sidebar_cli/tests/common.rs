use assert_cmd::Command;
use insta_cmd::get_cargo_bin;

pub fn sidebar_cmd() -> Command {
	let mut cmd = Command::new(get_cargo_bin("sidebarupdater"));
	cmd.env("NO_COLOR", "1").env_remove("RUST_LOG");
	cmd
}
