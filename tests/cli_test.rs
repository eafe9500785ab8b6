//! CLI integration tests for the openapi-lint binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("openapi-lint"))
}

// Helper to create a temp document file
fn write_temp_file(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

const CLEAN_DOC: &str = r#"{
    "openapi": "3.0.0",
    "info": { "title": "t", "version": "1" },
    "paths": {
        "/pets": {
            "get": {
                "operationId": "list_pets",
                "responses": { "200": { "description": "ok" } }
            }
        }
    }
}"#;

const NO_CODES_DOC: &str = r#"{
    "openapi": "3.0.0",
    "paths": { "/pets": { "get": { "operationId": "list_pets", "responses": {} } } }
}"#;

const WARNING_ONLY_DOC: &str = r#"{
    "openapi": "3.0.0",
    "paths": { "/pets": { "get": { "responses": { "200": { "description": "ok" } } } } }
}"#;

mod lint_command {
    use super::*;

    #[test]
    fn clean_document_passes() {
        let dir = TempDir::new().unwrap();
        let doc = write_temp_file(&dir, "api.json", CLEAN_DOC);

        cmd()
            .args(["lint", doc.to_str().unwrap()])
            .assert()
            .success()
            .stdout(predicate::str::contains("1 files checked, all passed"));
    }

    #[test]
    fn error_findings_exit_1() {
        let dir = TempDir::new().unwrap();
        let doc = write_temp_file(&dir, "api.json", NO_CODES_DOC);

        cmd()
            .args(["lint", doc.to_str().unwrap()])
            .assert()
            .code(1)
            .stdout(predicate::str::contains("error[no_response_codes]"))
            .stdout(predicate::str::contains("paths./pets.get.responses"));
    }

    #[test]
    fn dangling_ref_is_a_finding_not_a_failure() {
        let dir = TempDir::new().unwrap();
        let doc = write_temp_file(
            &dir,
            "api.json",
            r##"{
                "openapi": "3.0.0",
                "paths": {
                    "/pets": {
                        "get": {
                            "operationId": "list_pets",
                            "responses": { "200": { "$ref": "#/components/responses/Gone" } }
                        },
                        "post": { "operationId": "add_pet", "responses": {} }
                    }
                }
            }"##,
        );

        cmd()
            .args(["lint", doc.to_str().unwrap()])
            .assert()
            .code(1)
            .stdout(predicate::str::contains(
                "Cannot resolve reference `#/components/responses/Gone`",
            ))
            .stdout(predicate::str::contains("error[no_response_codes]"));
    }

    #[test]
    fn warnings_pass_unless_strict() {
        let dir = TempDir::new().unwrap();
        let doc = write_temp_file(&dir, "api.json", WARNING_ONLY_DOC);

        cmd()
            .args(["lint", doc.to_str().unwrap()])
            .assert()
            .success()
            .stdout(predicate::str::contains("warning[no_operation_id]"));

        cmd()
            .args(["lint", doc.to_str().unwrap(), "--strict"])
            .assert()
            .code(1);
    }

    #[test]
    fn json_format() {
        let dir = TempDir::new().unwrap();
        let doc = write_temp_file(&dir, "api.json", NO_CODES_DOC);

        let output = cmd()
            .args(["lint", doc.to_str().unwrap(), "--format", "json"])
            .assert()
            .code(1)
            .get_output()
            .stdout
            .clone();

        let report: serde_json::Value = serde_json::from_slice(&output).unwrap();
        assert_eq!(report["files_checked"], 1);
        assert_eq!(report["errors"], 1);
        let finding = &report["results"][0]["errors"][0];
        assert_eq!(
            finding["path"],
            serde_json::json!(["paths", "/pets", "get", "responses"])
        );
        assert_eq!(finding["rule"], "no_response_codes");
    }

    #[test]
    fn quiet_hides_passing_files() {
        let dir = TempDir::new().unwrap();
        write_temp_file(&dir, "good.json", CLEAN_DOC);
        write_temp_file(&dir, "bad.json", NO_CODES_DOC);

        cmd()
            .args(["lint", dir.path().to_str().unwrap(), "--quiet"])
            .assert()
            .code(1)
            .stdout(predicate::str::contains("bad.json"))
            .stdout(predicate::str::contains("good.json").not())
            .stdout(predicate::str::contains("Linting").not());
    }

    #[test]
    fn directory_with_yaml_and_json() {
        let dir = TempDir::new().unwrap();
        write_temp_file(&dir, "a.json", CLEAN_DOC);
        write_temp_file(
            &dir,
            "b.yml",
            "openapi: 3.0.0\npaths:\n  /b:\n    get:\n      operationId: get_b\n      responses:\n        '204':\n          description: none\n",
        );
        write_temp_file(&dir, "readme.md", "# not linted");

        cmd()
            .args(["lint", dir.path().to_str().unwrap()])
            .assert()
            .success()
            .stdout(predicate::str::contains("2 files checked, all passed"));
    }

    #[test]
    fn config_file_disables_rule() {
        let dir = TempDir::new().unwrap();
        let doc = write_temp_file(&dir, "api.json", NO_CODES_DOC);
        let config = write_temp_file(&dir, "lint.yaml", "responses:\n  no_response_codes: off\n");

        cmd()
            .args([
                "lint",
                doc.to_str().unwrap(),
                "--config",
                config.to_str().unwrap(),
            ])
            .assert()
            .success();
    }

    #[test]
    fn oas3_override() {
        let dir = TempDir::new().unwrap();
        let doc = write_temp_file(
            &dir,
            "api.json",
            r#"{"definitions": {"Pet": {"oneOf": "not-an-array"}}}"#,
        );

        cmd()
            .args(["lint", doc.to_str().unwrap()])
            .assert()
            .success();

        cmd()
            .args(["lint", doc.to_str().unwrap(), "--oas3", "true"])
            .assert()
            .code(1)
            .stdout(predicate::str::contains("oneOf value should be an array"));
    }
}

mod resolve_command {
    use super::*;

    const REF_DOC: &str = r##"{
        "openapi": "3.0.0",
        "paths": {
            "/pets": {
                "get": {
                    "responses": { "200": { "$ref": "#/components/responses/Ok" } }
                }
            }
        },
        "components": { "responses": { "Ok": { "description": "fine" } } }
    }"##;

    #[test]
    fn inlines_local_refs() {
        let dir = TempDir::new().unwrap();
        let doc = write_temp_file(&dir, "api.json", REF_DOC);

        cmd()
            .args(["resolve", doc.to_str().unwrap()])
            .assert()
            .success()
            .stdout(predicate::str::contains(
                r#""responses":{"200":{"description":"fine"}}"#,
            ));
    }

    #[test]
    fn resolve_with_pretty() {
        let dir = TempDir::new().unwrap();
        let doc = write_temp_file(&dir, "api.json", REF_DOC);

        cmd()
            .args(["resolve", doc.to_str().unwrap(), "--pretty"])
            .assert()
            .success()
            .stdout(predicate::str::contains("{\n"));
    }

    #[test]
    fn resolve_yaml_with_output_file() {
        let dir = TempDir::new().unwrap();
        let doc = write_temp_file(
            &dir,
            "api.yaml",
            "swagger: '2.0'\ndefinitions:\n  A:\n    type: string\n  B:\n    $ref: '#/definitions/A'\n",
        );
        let output = dir.path().join("out.json");

        cmd()
            .args([
                "resolve",
                doc.to_str().unwrap(),
                "--output",
                output.to_str().unwrap(),
            ])
            .assert()
            .success();

        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(written["definitions"]["B"]["type"], "string");
    }

    #[test]
    fn missing_local_ref() {
        let dir = TempDir::new().unwrap();
        let doc = write_temp_file(
            &dir,
            "api.json",
            r##"{"definitions": {"A": {"$ref": "#/definitions/Missing"}}}"##,
        );

        cmd()
            .args(["resolve", doc.to_str().unwrap()])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("cannot resolve reference"));
    }
}

mod error_handling {
    use super::*;

    #[test]
    fn path_not_found() {
        cmd()
            .args(["lint", "/nonexistent/api.yaml"])
            .assert()
            .code(3)
            .stderr(predicate::str::contains("not found"));
    }

    #[test]
    fn resolve_file_not_found() {
        cmd()
            .args(["resolve", "/nonexistent/api.json"])
            .assert()
            .code(3)
            .stderr(predicate::str::contains("not found"));
    }

    #[test]
    fn invalid_yaml_document() {
        let dir = TempDir::new().unwrap();
        let doc = write_temp_file(&dir, "api.yaml", "paths: [unclosed");

        cmd()
            .args(["lint", doc.to_str().unwrap()])
            .assert()
            .code(2)
            .stdout(predicate::str::contains("invalid YAML"));
    }

    #[test]
    fn unknown_severity_in_config() {
        let dir = TempDir::new().unwrap();
        let doc = write_temp_file(&dir, "api.json", CLEAN_DOC);
        let config = write_temp_file(
            &dir,
            "lint.json",
            r#"{"schemas": {"array_of_arrays": "loud"}}"#,
        );

        cmd()
            .args([
                "lint",
                doc.to_str().unwrap(),
                "--config",
                config.to_str().unwrap(),
            ])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("unknown severity \"loud\""));
    }

    #[test]
    fn missing_config_file() {
        let dir = TempDir::new().unwrap();
        let doc = write_temp_file(&dir, "api.json", CLEAN_DOC);

        cmd()
            .args(["lint", doc.to_str().unwrap(), "--config", "/nonexistent/lint.yaml"])
            .assert()
            .code(3);
    }

    #[test]
    fn invalid_oas3_value() {
        cmd()
            .args(["lint", ".", "--oas3", "maybe"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("--oas3"));
    }
}

mod help_and_version {
    use super::*;

    #[test]
    fn help_flag() {
        cmd()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Lint OpenAPI and Swagger documents"));
    }

    #[test]
    fn version_flag() {
        cmd()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("openapi-lint"));
    }

    #[test]
    fn lint_help() {
        cmd()
            .args(["lint", "--help"])
            .assert()
            .success()
            .stdout(predicate::str::contains("--config"))
            .stdout(predicate::str::contains("--strict"))
            .stdout(predicate::str::contains("--oas3"));
    }
}

mod fixtures {
    use super::*;

    #[test]
    fn petstore_fixture() {
        cmd()
            .args(["lint", "tests/fixtures/petstore.yaml", "--format", "json"])
            .assert()
            .code(1)
            .stdout(predicate::str::contains("\"errors\": 1"))
            .stdout(predicate::str::contains("\"warnings\": 3"))
            .stdout(predicate::str::contains("no_request_body_content"))
            .stdout(predicate::str::contains("\"authId\": \"unused_oauth\""));
    }

    #[test]
    fn swagger_fixture_is_clean() {
        cmd()
            .args(["lint", "tests/fixtures/swagger.json"])
            .assert()
            .success();
    }
}

#[cfg(feature = "remote")]
mod remote {
    use super::*;

    #[test]
    fn resolve_from_url() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", "/api.yaml")
            .with_status(200)
            .with_body("openapi: 3.0.0\ncomponents:\n  schemas:\n    A: { type: string }\n    B: { $ref: '#/components/schemas/A' }\n")
            .create();

        cmd()
            .args(["resolve", &format!("{}/api.yaml", server.url())])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""B":{"type":"string"}"#));
    }

    #[test]
    fn resolve_url_404() {
        let mut server = mockito::Server::new();
        let _mock = server.mock("GET", "/missing.json").with_status(404).create();

        cmd()
            .args(["resolve", &format!("{}/missing.json", server.url())])
            .assert()
            .code(3) // Network errors are exit code 3
            .stderr(predicate::str::contains("failed to fetch"));
    }
}
