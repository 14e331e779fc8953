mod common;

use incsrc_core::AnyEmptyResult;
use incsrc_core::IncsrcConfig;

#[test]
fn can_init() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	common::incsrc_cmd()
		.arg("init")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("Created incsrc.toml"));

	let config_content = std::fs::read_to_string(tmp.path().join("incsrc.toml"))?;
	assert!(config_content.contains("[templates]"));
	assert!(config_content.contains("[exclude]"));

	// Every section is commented out, so the sample parses to the defaults.
	let config = IncsrcConfig::load(tmp.path())?.ok_or("config not found")?;
	assert!(config.templates.is_empty());
	assert!(!config.include_hidden);

	Ok(())
}

#[test]
fn init_does_not_overwrite() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::create_dir_all(tmp.path().join(".config"))?;
	let config_path = tmp.path().join(".config/incsrc.toml");
	std::fs::write(&config_path, "include_hidden = true\n")?;

	common::incsrc_cmd()
		.arg("init")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("already exists"));

	assert_eq!(std::fs::read_to_string(&config_path)?, "include_hidden = true\n");
	assert!(!tmp.path().join("incsrc.toml").exists());

	Ok(())
}
