//! End-to-end tests for the generation pipeline.
//!
//! Components are JSON descriptions written into temporary directories, so
//! every test runs the real introspect, generate and write stages.

use netbridge_codegen::{BRIDGE_FILE, GeneratorOptions, MANIFEST_FILE, Pipeline};
use netbridge_core::{CollisionPolicy, Error, RunContext};
use serde_json::json;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// A temporary component plus destination directory.
struct Fixture {
    _dir: TempDir,
    ctx: RunContext,
}

impl Fixture {
    fn new(description: &serde_json::Value) -> Self {
        Self::named("Demo.json", description)
    }

    fn named(file_name: &str, description: &serde_json::Value) -> Self {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join(file_name);
        fs::write(&source, serde_json::to_string_pretty(description).unwrap()).unwrap();
        let out = dir.path().join("out");
        fs::create_dir(&out).unwrap();

        let ctx = RunContext::new(&source, &out).unwrap();
        Self { _dir: dir, ctx }
    }

    fn out(&self) -> &Path {
        self.ctx.destination()
    }

    fn run(&self, options: GeneratorOptions) -> netbridge_core::Result<netbridge_codegen::GenerationReport> {
        Pipeline::new(options)?.run(&self.ctx)
    }

    fn manifest(&self) -> toml::Table {
        toml::from_str(&fs::read_to_string(self.out().join(MANIFEST_FILE)).unwrap()).unwrap()
    }

    fn bridge(&self) -> String {
        fs::read_to_string(self.out().join(BRIDGE_FILE)).unwrap()
    }

    fn out_is_empty(&self) -> bool {
        fs::read_dir(self.out()).unwrap().next().is_none()
    }
}

fn demo_component() -> serde_json::Value {
    json!({
        "types": [
            {
                "namespace": "Demo",
                "name": "Calc",
                "members": [
                    {"name": "Add", "return_type": "System.Int32",
                     "parameter_types": ["System.Int32", "System.Int32"]},
                    {"name": "Log", "is_static": true, "return_type": "System.Void",
                     "parameter_types": ["System.String"]},
                    {"name": "Describe", "is_static": true, "return_type": "System.String"}
                ]
            },
            {
                "namespace": "Demo",
                "name": "Point",
                "kind": "struct",
                "members": [{"name": "Length", "return_type": "System.Double"}]
            }
        ]
    })
}

fn export_identifiers(bridge: &str) -> Vec<String> {
    let start = bridge.find("const handlers = {").unwrap();
    bridge[start..]
        .lines()
        .filter_map(|line| line.strip_prefix("  ")?.strip_suffix(": (payload = null) =>"))
        .map(str::to_string)
        .collect()
}

/// Tests the reference Add scenario end to end.
#[test]
fn test_add_scenario() {
    let fixture = Fixture::new(&demo_component());
    let report = fixture.run(GeneratorOptions::default()).unwrap();

    assert_eq!(report.identifiers, ["Demo_Calc_Add", "Demo_Calc_Describe"]);
    assert_eq!(
        report.written,
        [fixture.out().join(MANIFEST_FILE), fixture.out().join(BRIDGE_FILE)]
    );

    let manifest = fixture.manifest();
    let add = &manifest["export"].as_array().unwrap()[0];
    assert_eq!(add["namespace"].as_str(), Some("Demo"));
    assert_eq!(add["class"].as_str(), Some("Calc"));
    assert_eq!(add["method"].as_str(), Some("Add"));
    assert_eq!(add["static"].as_bool(), Some(false));
    assert_eq!(add["returns"].as_str(), Some("System.Int32"));
    let params: Vec<_> = add["params"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p.as_str().unwrap())
        .collect();
    assert_eq!(params, ["System.Int32", "System.Int32"]);

    let bridge = fixture.bridge();
    assert!(bridge.contains("const Demo_Calc_Add_raw = edge.func({"));
    assert!(bridge.contains("  Demo_Calc_Add: (payload = null) =>"));
    assert!(bridge.contains("Demo_Calc_Add_raw(payload, (error, result) => {"));
}

/// Tests that void members and members of non-class types are left out.
#[test]
fn test_void_and_struct_members_excluded() {
    let fixture = Fixture::new(&demo_component());
    fixture.run(GeneratorOptions::default()).unwrap();

    let manifest = fixture.manifest();
    let methods: Vec<_> = manifest["export"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["method"].as_str().unwrap())
        .collect();
    assert_eq!(methods, ["Add", "Describe"]);

    let bridge = fixture.bridge();
    assert!(!bridge.contains("Log"));
    assert!(!bridge.contains("Length"));
}

/// Tests that the manifest and bridge agree on members and order.
#[test]
fn test_manifest_and_bridge_agree() {
    let fixture = Fixture::new(&json!({
        "types": [
            {"namespace": "Zeta", "name": "Last", "members": [
                {"name": "Run", "return_type": "System.Object"}
            ]},
            {"name": "Util", "members": [
                {"name": "Now", "is_static": true, "return_type": "System.DateTime"}
            ]},
            {"namespace": "Alpha", "name": "First", "members": [
                {"name": "Go", "return_type": "System.Boolean"}
            ]}
        ]
    }));
    let report = fixture.run(GeneratorOptions::default()).unwrap();

    let manifest = fixture.manifest();
    let from_manifest: Vec<_> = manifest["export"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| {
            netbridge_core::derive_identifier(
                e["namespace"].as_str().unwrap(),
                e["class"].as_str().unwrap(),
                e["method"].as_str().unwrap(),
            )
        })
        .collect();

    assert_eq!(from_manifest, ["Zeta_Last_Run", "Global_Util_Now", "Alpha_First_Go"]);
    assert_eq!(export_identifiers(&fixture.bridge()), from_manifest);
    assert_eq!(report.identifiers, from_manifest);
}

/// Tests the one-to-one character substitution in identifiers.
#[test]
fn test_non_identifier_characters_substituted() {
    let fixture = Fixture::new(&json!({
        "types": [{"namespace": "Demo", "name": "Calc", "members": [
            {"name": "Do-It!", "return_type": "System.Int32"}
        ]}]
    }));
    let report = fixture.run(GeneratorOptions::default()).unwrap();

    assert_eq!(report.identifiers, ["Demo_Calc_Do_It_"]);
    let bridge = fixture.bridge();
    assert!(bridge.contains("  Demo_Calc_Do_It_: (payload = null) =>"));
    // The bridge still calls the member by its real name.
    assert!(bridge.contains("  methodName: 'Do-It!',\n"));
}

/// Tests that identical inputs produce byte-identical artifacts.
#[test]
fn test_generation_is_deterministic() {
    let fixture = Fixture::new(&demo_component());

    fixture.run(GeneratorOptions::default()).unwrap();
    let manifest = fs::read(fixture.out().join(MANIFEST_FILE)).unwrap();
    let bridge = fs::read(fixture.out().join(BRIDGE_FILE)).unwrap();

    fixture.run(GeneratorOptions::default()).unwrap();
    assert_eq!(fs::read(fixture.out().join(MANIFEST_FILE)).unwrap(), manifest);
    assert_eq!(fs::read(fixture.out().join(BRIDGE_FILE)).unwrap(), bridge);
}

/// Tests that the source path is absolute in both artifacts.
#[test]
fn test_source_path_is_absolute() {
    let fixture = Fixture::new(&demo_component());
    fixture.run(GeneratorOptions::default()).unwrap();

    let manifest = fixture.manifest();
    let path = manifest["source"]["path"].as_str().unwrap();
    assert!(Path::new(path).is_absolute());
    assert_eq!(Path::new(path), fixture.ctx.source_path());
    assert!(fixture.bridge().contains(&format!(
        "  assemblyFile: '{}',",
        netbridge_core::escape_single_quoted(path)
    )));
}

/// Tests that a description naming its assembly binds the bridge to that file.
#[test]
fn test_description_assembly_is_bridge_target() {
    let mut description = demo_component();
    description["assembly"] = json!("bin/Demo.dll");
    let fixture = Fixture::new(&description);
    let report = fixture.run(GeneratorOptions::default()).unwrap();

    let dll = fixture
        .ctx
        .source_path()
        .parent()
        .unwrap()
        .join("bin")
        .join("Demo.dll");
    assert_eq!(report.source, dll);

    let manifest = fixture.manifest();
    assert_eq!(
        Path::new(manifest["source"]["path"].as_str().unwrap()),
        dll.as_path()
    );
    let bridge = fixture.bridge();
    assert!(bridge.contains(&format!(
        "  assemblyFile: '{}',",
        netbridge_core::escape_single_quoted(dll.to_str().unwrap())
    )));
    assert!(!bridge.contains("Demo.json"));
}

/// Tests that a source path with a quote survives both artifacts.
#[test]
fn test_quote_in_source_path() {
    let fixture = Fixture::named("O'Brien.Tools.json", &demo_component());
    fixture.run(GeneratorOptions::default()).unwrap();

    let manifest = fixture.manifest();
    let path = manifest["source"]["path"].as_str().unwrap();
    assert!(path.ends_with("O'Brien.Tools.json"));
    assert!(fixture.bridge().contains(r"O\'Brien.Tools.json',"));
}

/// Tests that a component without eligible members writes nothing.
#[test]
fn test_nothing_to_export_writes_nothing() {
    let fixture = Fixture::new(&json!({
        "types": [
            {"namespace": "Demo", "name": "Calc", "members": [
                {"name": "Log", "return_type": "System.Void"},
                {"name": "Hidden", "visibility": "private", "return_type": "System.Int32"},
                {"name": "get_Value", "is_special": true, "return_type": "System.Int32"}
            ]},
            {"namespace": "Demo", "name": "IShape", "kind": "interface", "members": [
                {"name": "Area", "return_type": "System.Double"}
            ]}
        ]
    }));

    let err = fixture.run(GeneratorOptions::default()).unwrap_err();
    assert!(err.is_nothing_to_export());
    assert!(fixture.out_is_empty());
}

/// Tests that a malformed description fails before anything is written.
#[test]
fn test_malformed_component_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("Broken.json");
    fs::write(&source, "{ \"types\": [ { \"name\": ").unwrap();
    let ctx = RunContext::new(&source, dir.path()).unwrap();

    let err = Pipeline::new(GeneratorOptions::default())
        .unwrap()
        .run(&ctx)
        .unwrap_err();
    assert!(err.is_not_loadable());
    assert!(!dir.path().join(MANIFEST_FILE).exists());
    assert!(!dir.path().join(BRIDGE_FILE).exists());
}

fn overloaded_component() -> serde_json::Value {
    json!({
        "types": [{"namespace": "Demo", "name": "Calc", "members": [
            {"name": "Add", "return_type": "System.Int32",
             "parameter_types": ["System.Int32", "System.Int32"]},
            {"name": "Add", "return_type": "System.Double",
             "parameter_types": ["System.Double", "System.Double"]}
        ]}]
    })
}

/// Tests that overloads are disambiguated with numeric suffixes by default.
#[test]
fn test_overloads_suffixed() {
    let fixture = Fixture::new(&overloaded_component());
    let report = fixture.run(GeneratorOptions::default()).unwrap();

    assert_eq!(report.identifiers, ["Demo_Calc_Add", "Demo_Calc_Add_2"]);
    assert_eq!(
        export_identifiers(&fixture.bridge()),
        ["Demo_Calc_Add", "Demo_Calc_Add_2"]
    );
    assert_eq!(fixture.manifest()["export"].as_array().unwrap().len(), 2);
}

/// Tests that the allow policy keeps duplicate identifiers.
#[test]
fn test_overloads_allowed() {
    let fixture = Fixture::new(&overloaded_component());
    let options = GeneratorOptions::default().with_collision_policy(CollisionPolicy::Allow);
    let report = fixture.run(options).unwrap();

    assert_eq!(report.identifiers, ["Demo_Calc_Add", "Demo_Calc_Add"]);
}

/// Tests that the reject policy fails and writes nothing.
#[test]
fn test_overloads_rejected() {
    let fixture = Fixture::new(&overloaded_component());
    let options = GeneratorOptions::default().with_collision_policy(CollisionPolicy::Reject);
    let err = fixture.run(options).unwrap_err();

    match err {
        Error::IdentifierCollision { identifier, .. } => assert_eq!(identifier, "Demo_Calc_Add"),
        other => panic!("unexpected error: {other}"),
    }
    assert!(fixture.out_is_empty());
}

/// Tests that a rerun replaces previously generated files.
#[test]
fn test_rerun_overwrites_existing_artifacts() {
    let fixture = Fixture::new(&demo_component());
    fs::write(fixture.out().join(MANIFEST_FILE), "stale = true\n".repeat(100)).unwrap();
    fs::write(fixture.out().join(BRIDGE_FILE), "// stale\n".repeat(100)).unwrap();

    fixture.run(GeneratorOptions::default()).unwrap();

    assert!(fixture.manifest().get("stale").is_none());
    assert!(!fixture.bridge().contains("stale"));
}

/// Tests that a custom bridge module name is required at runtime.
#[test]
fn test_custom_bridge_module() {
    let fixture = Fixture::new(&demo_component());
    let options = GeneratorOptions::default().with_bridge_module("electron-edge-js");
    fixture.run(options).unwrap();

    let bridge = fixture.bridge();
    assert!(bridge.contains("const edge = require('electron-edge-js');"));
    assert!(!bridge.contains("'edge-js'"));
}

/// Tests output encoding: UTF-8, no BOM, LF line endings.
#[test]
fn test_output_encoding() {
    let fixture = Fixture::new(&json!({
        "types": [{"namespace": "Démo", "name": "Calc", "members": [
            {"name": "Add", "return_type": "System.Int32"}
        ]}]
    }));
    fixture.run(GeneratorOptions::default()).unwrap();

    for name in [MANIFEST_FILE, BRIDGE_FILE] {
        let bytes = fs::read(fixture.out().join(name)).unwrap();
        assert!(!bytes.starts_with(&[0xEF, 0xBB, 0xBF]), "{name} has a BOM");
        assert!(!bytes.contains(&b'\r'), "{name} has CR line endings");
        assert!(String::from_utf8(bytes).unwrap().ends_with('\n'));
    }
    assert!(fixture.bridge().contains("  Démo_Calc_Add: (payload = null) =>"));
}
