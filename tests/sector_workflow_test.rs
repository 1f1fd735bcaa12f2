use std::io::Write;
use tempfile::NamedTempFile;
use tray_sizer::config::sector_file::SectorFile;
use tray_sizer::core::aggregate::{GroupUpdate, SectorUpdate};
use tray_sizer::core::{
    Arrangement, CableSpec, CalculationReport, InstallationLayout, Project, SectorStore, TrayType,
};
use tray_sizer::{InMemoryCatalog, InMemorySectorStore, SizingError, SizingFactors, TraySizer};

const CATALOG_CSV: &str = "\
id,type,category,thickness,width,height,load_capacity,active,code,name
E-100,escalerilla,Liviana,1.5,100,50,40,true,ESC-100,Escalerilla 100
E-200,escalerilla,Semi Pesada,2.0,200,100,90,true,ESC-200,Escalerilla 200
E-300,escalerilla,Pesada,2.5,300,100,150,true,,
C-100,canal,Liviana,1.2,100,50,35,true,CAN-100,Canal 100
C-300,canal,Super Pesada,3.0,300,100,200,true,,
";

const SECTOR_TOML: &str = r#"
id = "pump-room"
name = "Pump room"
tray_type = "ladder"
reserve_percentage = 30
layout = "single-layer"

[[cables]]
quantity = 4
spec = { nominal_section_mm2 = "16", nominal_section_awg = "6", external_diameter_mm = 12.0, external_area_mm2 = 113.1, mass_per_length_kg_m = 0.6 }
"#;

fn catalog_file() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(CATALOG_CSV.as_bytes()).unwrap();
    file
}

fn spec() -> CableSpec {
    CableSpec {
        nominal_section_mm2: "16".to_string(),
        nominal_section_awg: "6".to_string(),
        external_diameter_mm: 12.0,
        external_area_mm2: 113.1,
        mass_per_length_kg_m: 0.6,
    }
}

#[tokio::test]
async fn test_files_to_results() {
    let catalog_file = catalog_file();
    let catalog = InMemoryCatalog::from_csv_file(catalog_file.path()).unwrap();
    assert_eq!(catalog.len(), 5);
    assert_eq!(catalog.trays()[0].code.as_deref(), Some("ESC-100"));
    assert_eq!(catalog.trays()[2].code, None);

    let mut sector = SectorFile::from_toml_str(SECTOR_TOML)
        .unwrap()
        .into_sector()
        .unwrap();
    let sizer = TraySizer::new(catalog, SizingFactors::default());
    sizer.size_sector(&mut sector).await.unwrap();

    // 4 x 12mm = 48mm raw, 68.64mm factored
    let results = sector.results().unwrap();
    assert_eq!(results.optimal.as_ref().unwrap().id, "E-100");
    let ids: Vec<&str> = results.alternatives.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["E-200", "E-300"]);
}

#[tokio::test]
async fn test_mutations_invalidate_stored_results() {
    let catalog = InMemoryCatalog::from_csv_file(catalog_file().path()).unwrap();
    let sizer = TraySizer::new(catalog, SizingFactors::default());

    let mut project = Project::unsectored("Water plant", "ACME", "Antofagasta");
    project.attach_calculation_report(CalculationReport {
        file_id: "report-1".to_string(),
    });
    let mut general = project.sector_mut("general").unwrap();
    let group_id = general.add_group(spec(), 4, Arrangement::SideBySide).unwrap();
    sizer.size_sector(&mut general).await.unwrap();
    assert!(general.results().is_some());

    // Renaming keeps the results.
    general
        .update(SectorUpdate {
            name: Some("General services".to_string()),
            ..Default::default()
        })
        .unwrap();
    assert!(general.results().is_some());

    general
        .update(SectorUpdate {
            tray_type: Some(TrayType::Channel),
            ..Default::default()
        })
        .unwrap();
    assert!(general.results().is_none());

    sizer.size_sector(&mut general).await.unwrap();
    assert_eq!(
        general.results().unwrap().optimal.as_ref().unwrap().id,
        "C-100"
    );

    general
        .update_group(
            group_id,
            GroupUpdate {
                arrangement: Some(Arrangement::Bundled),
                ..Default::default()
            },
        )
        .unwrap();
    assert!(general.results().is_none());

    sizer.size_sector(&mut general).await.unwrap();
    general
        .update(SectorUpdate {
            layout: Some(InstallationLayout::MultiLayer),
            ..Default::default()
        })
        .unwrap();
    assert!(general.results().is_none());

    drop(general);
    assert!(project.calculation_report().is_none());
    assert_eq!(project.sectors()[0].name(), "General services");
}

#[tokio::test]
async fn test_stale_compute_cannot_overwrite_newer_sector() {
    let catalog = InMemoryCatalog::from_csv_file(catalog_file().path()).unwrap();
    let sizer = TraySizer::new(catalog, SizingFactors::default());
    let store = InMemorySectorStore::new();

    let sector = SectorFile::from_toml_str(SECTOR_TOML)
        .unwrap()
        .into_sector()
        .unwrap();
    store.insert(sector).await.unwrap();

    // A compute reads the sector...
    let snapshot = store.read("pump-room").await.unwrap();
    let stale_results = sizer.compute_optimal_tray(&snapshot).await.unwrap();

    // ...while a cable edit is committed.
    let mut edited = store.read("pump-room").await.unwrap();
    let base = edited.version();
    let group_id = edited.groups()[0].id;
    edited
        .update_group(
            group_id,
            GroupUpdate {
                quantity: Some(40),
                ..Default::default()
            },
        )
        .unwrap();
    store.write(edited, base).await.unwrap();

    let mut late = snapshot.clone();
    late.commit_results(stale_results).unwrap();
    let err = store.write(late, snapshot.version()).await.unwrap_err();
    assert!(matches!(err, SizingError::VersionConflict { .. }));
    assert!(store.read("pump-room").await.unwrap().results().is_none());

    let sized = sizer.size_stored_sector(&store, "pump-room").await.unwrap();
    let stored = store.read("pump-room").await.unwrap();
    assert_eq!(stored.results(), sized.results());
    assert_eq!(stored.groups()[0].quantity, 40);
}

#[test]
fn test_catalog_loading_is_usable_from_sync_code() {
    let file = catalog_file();
    let catalog = InMemoryCatalog::from_csv_file(file.path()).unwrap();
    let sizer = TraySizer::new(catalog, SizingFactors::default());
    let sector = SectorFile::from_toml_str(SECTOR_TOML)
        .unwrap()
        .into_sector()
        .unwrap();

    let results = tokio_test::block_on(sizer.compute_optimal_tray(&sector)).unwrap();
    assert!((results.calculated_load_kg_m - 2.4).abs() < 1e-9);
    assert!((results.calculated_area_mm2 - 452.4).abs() < 1e-9);
}
