/// Command-level tests running the data pipeline over files in a temp directory
mod common;

use common::{sample_dataset, TestEnvironment};
use eggcyc::cli::commands::class_table::{self, ClassTableArgs};
use eggcyc::cli::commands::common_names::{self, CommonNamesArgs};
use eggcyc::core::config::{default_config, load_config, Config};
use eggcyc::{EggcycError, TreeDataset, TreeRecord};
use flate2::write::GzEncoder;
use flate2::Compression;
use pretty_assertions::assert_eq;
use std::fs;
use std::io::Write;
use std::path::Path;

const USDA_CSV: &str = r#""Symbol","Synonym Symbol","Scientific Name with Author","Common Name","Family"
"QURU","","Quercus rubra L.","northern red oak","Fagaceae"
"QUBO2","QURU","Quercus borealis Michx. f.","","Fagaceae"
"QUAL","","Quercus alba L.","white oak","Fagaceae"
"ACSA3","","Acer saccharum Marshall","sugar maple","Sapindaceae"
"ACSAS","","Acer saccharum Marshall ssp. saccharum","","Sapindaceae"
"GIBI2","","Ginkgo biloba L.","","Ginkgoaceae"
"#;

fn write_usda(path: &Path) {
    let mut encoder = GzEncoder::new(fs::File::create(path).unwrap(), Compression::default());
    encoder.write_all(USDA_CSV.as_bytes()).unwrap();
    encoder.finish().unwrap();
}

fn class_table_args(env: &TestEnvironment, strict: bool) -> ClassTableArgs {
    ClassTableArgs {
        trees: Some(env.path("trees_processed.json")),
        higher_taxa: Some(env.path("higher_taxa_processed.json")),
        output: Some(env.path("site/_includes/class_table.html")),
        strict,
        lookup: false,
        quiet: true,
    }
}

#[test]
fn test_common_names_fills_missing_names() {
    let env = TestEnvironment::new();
    let trees_path = env.write(
        "trees.json",
        r#"{
            "Quercus rubra": {"notes": "street tree"},
            "Quercus alba": {"common_name": "Eastern white oak"},
            "Ginkgo biloba": {},
            "Ulmus americana": {}
        }"#,
    );
    let usda_path = env.path("usda.csv.gz");
    write_usda(&usda_path);

    let args = CommonNamesArgs {
        trees: Some(trees_path),
        processed: Some(env.path("trees_processed.json")),
        usda: Some(usda_path),
        all: false,
        ott: false,
        quiet: true,
    };
    common_names::run(args, &default_config()).unwrap();

    let processed = TreeDataset::load(env.path("trees_processed.json")).unwrap();
    assert_eq!(processed.common_name("Quercus rubra"), Some("Northern red oak"));
    assert_eq!(processed.common_name("Quercus alba"), Some("Eastern white oak"));
    // Listed without a common name, or not listed at all
    assert_eq!(processed.common_name("Ginkgo biloba"), None);
    assert_eq!(processed.common_name("Ulmus americana"), None);
    assert_eq!(
        processed.get("Quercus rubra").unwrap().extra["notes"],
        serde_json::json!("street tree")
    );
}

#[test]
fn test_common_names_reuses_processed_records() {
    let env = TestEnvironment::new();
    let trees_path = env.write("trees.json", r#"{"Quercus rubra": {}}"#);
    let processed_path = env.write(
        "trees_processed.json",
        r#"{"Quercus rubra": {"common_name": "Red oak", "ott_id": 791115}}"#,
    );
    let usda_path = env.path("usda.csv.gz");
    write_usda(&usda_path);
    let before = fs::read_to_string(&processed_path).unwrap();

    let args = CommonNamesArgs {
        trees: Some(trees_path.clone()),
        processed: Some(processed_path.clone()),
        usda: Some(usda_path.clone()),
        all: false,
        ott: false,
        quiet: true,
    };
    common_names::run(args, &default_config()).unwrap();
    // Nothing changed, nothing written
    assert_eq!(fs::read_to_string(&processed_path).unwrap(), before);

    let args = CommonNamesArgs {
        trees: Some(trees_path),
        processed: Some(processed_path.clone()),
        usda: Some(usda_path),
        all: true,
        ott: false,
        quiet: true,
    };
    common_names::run(args, &default_config()).unwrap();
    let processed = TreeDataset::load(&processed_path).unwrap();
    assert_eq!(processed.common_name("Quercus rubra"), Some("Northern red oak"));
    assert_eq!(processed.get("Quercus rubra").unwrap().ott_id, None);
}

#[test]
fn test_class_table_command_writes_include() {
    let env = TestEnvironment::new();
    sample_dataset()
        .save(env.path("trees_processed.json"))
        .unwrap();
    env.write(
        "higher_taxa_processed.json",
        r#"{"Fagaceae": {"gbif_id": 4689, "common_name": "Beech family"}}"#,
    );

    class_table::run(class_table_args(&env, false), &default_config()).unwrap();

    let html = fs::read_to_string(env.path("site/_includes/class_table.html")).unwrap();
    assert!(html.starts_with("<div class=\"classification\">\n<table>\n"));
    assert_eq!(html.matches("<tr>").count(), 5);
    assert!(html.contains("<td rowspan=\"3\">Beech family (<i>Fagaceae</i>)</td>"));
    assert!(html.contains("<td rowspan=\"1\">Sugar maple (<i>Acer saccharum</i>)</td>"));
}

#[test]
fn test_class_table_strict_reports_rank_gap() {
    let env = TestEnvironment::new();
    let mut trees = sample_dataset();
    let mut gappy = common::maple("Acer rubrum");
    gappy.retain(|e| e.rank != "GENUS");
    trees.insert("Acer rubrum", TreeRecord::new().with_classification(gappy));
    trees.save(env.path("trees_processed.json")).unwrap();

    // Lenient: written without the gappy species
    class_table::run(class_table_args(&env, false), &default_config()).unwrap();
    let html = fs::read_to_string(env.path("site/_includes/class_table.html")).unwrap();
    assert!(!html.contains("Acer rubrum"));

    let err = class_table::run(class_table_args(&env, true), &default_config()).unwrap_err();
    match err.downcast_ref::<EggcycError>() {
        Some(EggcycError::RankGap { species, .. }) => assert_eq!(species, "Acer rubrum"),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_config_gap_policy_and_ranks() {
    let env = TestEnvironment::new();
    let config_path = env.write(
        "eggcyc.toml",
        r#"
        [table]
        ranks = ["ORDER", "FAMILY", "GENUS"]
        rotated_ranks = ["ORDER"]
        gap_policy = "fail"
        "#,
    );
    let config: Config = load_config(&config_path).unwrap();
    sample_dataset()
        .save(env.path("trees_processed.json"))
        .unwrap();

    class_table::run(class_table_args(&env, false), &config).unwrap();
    let html = fs::read_to_string(env.path("site/_includes/class_table.html")).unwrap();
    assert!(html.contains("<th><div class=\"rotated\">ORDER</div></th>\n<th><div class=\"rotated\">FAMILY</div></th>\n<th><div class=\"rotated\">GENUS</div></th>\n</tr>"));
    assert!(html.contains("<td rowspan=\"3\"><div class=\"rotated\"><i>Fagales</i></div></td>"));
    assert!(!html.contains("KINGDOM"));
}

#[test]
fn test_missing_tree_list_is_io_error() {
    let env = TestEnvironment::new();
    let err = class_table::run(class_table_args(&env, false), &default_config()).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<EggcycError>(),
        Some(EggcycError::Io(_))
    ));
    assert!(format!("{:#}", err).contains("Failed to read tree list"));
}
