//! Config loading and name resolution against the fixture app.

use maestro::config::Parser;
use maestro::naming::NamingContext;
use maestro::template::{TemplateId, UnitTemplates};
use maestro::{Deployment, Error};
use std::path::{Path, PathBuf};

fn fixture_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/maestro.json")
}

fn resolve(build_root: &str) -> Deployment {
    let app = Parser::new()
        .load_config(fixture_path())
        .expect("Failed to load fixture");
    app.validate().expect("Fixture should validate");
    let ctx = NamingContext::new("alice", "maestro.io", "/share/maestro", build_root);
    Deployment::resolve(&app, &ctx)
}

#[test]
fn test_load_fixture() {
    let app = Parser::new().load_config(fixture_path()).unwrap();

    assert_eq!(app.name, "app1");
    assert_eq!(app.stages.len(), 2);
    assert!(app.username.is_none());

    let prod = app.stage("prod").unwrap();
    assert_eq!(prod.components.len(), 3);
    assert_eq!(prod.component("web").unwrap().scale, 2);
    assert_eq!(prod.component("web").unwrap().after.as_deref(), Some("db"));
    assert!(app.stage("staging").unwrap().component("web").unwrap().keep_on_exit);
}

#[test]
fn test_explicit_missing_config_is_an_error() {
    let err = Parser::new()
        .locate(Some(Path::new("/nonexistent/app.json")))
        .unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[test]
fn test_find_config_walks_up() {
    let start = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/nested/deeper");
    let found = Parser::find_config_in_dir(&start).unwrap();
    assert_eq!(found, fixture_path());
}

#[test]
fn test_resolved_unit_names() {
    let deployment = resolve("/home/alice/.maestro");
    let prod = &deployment.stages[0];
    let db = &prod.components[0];
    let web = &prod.components[1];
    let agent = &prod.components[2];

    assert_eq!(db.unit_name, "alice_prod_app1_db@1");
    assert_eq!(web.unit_name, "alice_prod_app1_web@%i");
    assert_eq!(agent.unit_name, "alice_prod_app1_agent@%H");
    assert_eq!(agent.scale, 1);

    assert_eq!(
        prod.app_path,
        PathBuf::from("/home/alice/.maestro/alice/prod/app1")
    );
    assert_eq!(
        web.unit_path,
        PathBuf::from("/home/alice/.maestro/alice/prod/app1/alice_prod_app1_web@.service")
    );
    assert_eq!(
        web.build_unit_name.as_deref(),
        Some("alice_prod_app1_web-build.service")
    );
    assert!(db.build_unit_name.is_none());
}

#[test]
fn test_resolved_dns_and_volumes() {
    let deployment = resolve("/m");
    let prod = &deployment.stages[0];
    let db = &prod.components[0];
    let web = &prod.components[1];

    assert_eq!(db.internal_dns, "1.db.app1.prod.alice.maestro.io");
    assert_eq!(web.internal_dns, "%i.web.app1.prod.alice.maestro.io");
    assert_eq!(web.dns, "alice-prod-app1-web.maestro.io");
    assert_eq!(db.volumes_dir, "/share/maestro/alice/prod/app1");
    assert_eq!(db.volumes, vec!["/share/maestro/alice/prod/app1/data:data"]);
    assert_eq!(web.after.as_deref(), Some("alice_prod_app1_db@1.service"));
    assert_eq!(web.registry_key, "/maestro.io/alice/prod/app1/web/%i");

    let staging_web = &deployment.stages[1].components[0];
    assert_eq!(staging_web.dns, "staging.example.com");
    assert_eq!(staging_web.unit_name, "alice_staging_app1_web@1");
}

#[test]
fn test_run_targets_span_stages() {
    let deployment = resolve("/m");
    let names: Vec<String> = deployment
        .run_targets(None)
        .unwrap()
        .into_iter()
        .map(|target| target.name)
        .collect();

    assert_eq!(
        names,
        vec![
            "alice_prod_app1_db@1",
            "alice_prod_app1_web@1",
            "alice_prod_app1_web@2",
            "alice_prod_app1_agent@1",
            "alice_staging_app1_web@1",
        ]
    );

    // A bare component name matches in every stage
    assert_eq!(deployment.run_targets(Some("web")).unwrap().len(), 3);
}

#[test]
fn test_rendered_run_unit() {
    let deployment = resolve("/m");
    let templates = UnitTemplates::new(None);
    let web = &deployment.stages[0].components[1];

    let text = templates.render_to_string(web, TemplateId::RunUnit).unwrap();
    assert!(text.contains("--name alice_prod_app1_web@%i"));
    assert!(text.contains("After=alice_prod_app1_db@1.service"));
    assert!(text.contains("-p 80:80"));
    assert!(text.contains("-e MODE=prod"));
    assert!(text.contains("MachineMetadata=frontend=true"));
    assert!(!text.contains("{{"));

    let agent = &deployment.stages[0].components[2];
    let text = templates.render_to_string(agent, TemplateId::RunUnit).unwrap();
    assert!(text.contains("Global=true"));

    let staging_web = &deployment.stages[1].components[0];
    let text = templates
        .render_to_string(staging_web, TemplateId::RunUnit)
        .unwrap();
    assert!(!text.contains("ExecStopPost=-/usr/bin/docker rm"));
}

#[test]
fn test_rendered_build_unit() {
    let deployment = resolve("/m");
    let templates = UnitTemplates::new(None);
    let web = &deployment.stages[0].components[1];

    let text = templates.render_to_string(web, TemplateId::BuildUnit).unwrap();
    assert!(text.contains("https://github.com/crisidev/web"));
    assert!(text.contains("crisidev/web"));
}

#[test]
fn test_invalid_names_rejected() {
    let app = Parser::new()
        .parse_config(r#"{"app": "my_app", "stages": []}"#)
        .unwrap();
    assert!(matches!(app.validate(), Err(Error::Validation(_))));

    let app = Parser::new()
        .parse_config(
            r#"{"app": "app1", "stages": [{"name": "prod", "components": [
                {"name": "web", "after": "cache"}
            ]}]}"#,
        )
        .unwrap();
    assert!(matches!(app.validate(), Err(Error::Validation(_))));
}

#[test]
fn test_malformed_json_is_parse_error() {
    let err = Parser::new().parse_config("{\"app\": ").unwrap_err();
    assert!(matches!(err, Error::Parse(_)));
}
