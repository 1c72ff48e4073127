//! Integration tests for product documents on disk

use serde_json::json;
use tempfile::TempDir;
use uuid::Uuid;
use wm_storage::{DataType, Error, Parameter, Product, TriggerSource};

fn populated_product() -> Product {
    let mut product = Product::new(Uuid::new_v4());
    product.set_name("Housing");
    product.set_product_type(12);
    product.set_endless(true);
    product.set_trigger_source(TriggerSource::External);
    product.set_start_position_y_axis(250);
    product.signal_quality_color_map_mut().push(0.0, "#00ff00");
    product.create_hardware_parameters();

    let series = product.create_first_seam_series().unwrap();
    let seam_id = product.create_seam_in(&series).unwrap();
    product.create_seam_in(&series).unwrap();
    product.create_seam_link(&seam_id, "7").unwrap();

    let first = product.create_first_seam_interval(&seam_id).unwrap();
    let second = product.create_seam_interval(&seam_id).unwrap();
    let seam = product.find_seam_mut(&seam_id).unwrap();
    seam.set_velocity(40);
    seam.find_seam_interval_mut(&first).unwrap().set_length(120);
    seam.find_seam_interval_mut(&second).unwrap().set_length(80);
    seam.add_interval_error(Uuid::new_v4(), None);
    let curve = seam.task_mut().create_reference_curve(604).uuid();
    seam.task_mut().add_error(Uuid::new_v4(), None).set_envelope(curve);
    let set = seam.task().graph_param_set();

    product
        .filter_parameter_set_mut(&set)
        .unwrap()
        .add_parameter(Parameter::new(Uuid::new_v4(), "threshold", DataType::Integer, json!(5)));
    product.add_overlying_error(Uuid::new_v4(), None);
    product
}

#[test]
fn test_round_trip_through_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("housing.json");
    let product = populated_product();
    product.save(&path).unwrap();

    let loaded = Product::load(&path).unwrap();
    assert_eq!(loaded.to_json(), product.to_json());
    assert_eq!(loaded.trigger_source(), TriggerSource::External);
    assert_eq!(loaded.all_seams().len(), 3);
    assert!(loaded.find_seam_by_number(0, 7).unwrap().is_link());

    let seam = loaded.find_seam_by_number(0, 0).unwrap().seam();
    assert_eq!(seam.length(), 200);
    assert_eq!(seam.interval_errors()[0].error_ids().len(), 2);
    assert_eq!(seam.task().reference_curves().len(), 1);
}

#[test]
fn test_legacy_keys_are_normalized() {
    let product_id = Uuid::new_v4();
    let set_id = Uuid::new_v4();
    let document = json!({
        "uuid": product_id.to_string(),
        "name": "Legacy",
        "seamSeries": [{
            "uuid": format!("{{{}}}", Uuid::new_v4()),
            "number": 0,
            "seams": [{
                "uuid": Uuid::new_v4().to_string(),
                "number": 0,
                "graphParamSet": set_id.to_string(),
                "sumError": [{"uuid": Uuid::new_v4().to_string(), "variantId": Uuid::new_v4().to_string(), "length": 4.5}],
                "seamIntervals": [{"uuid": Uuid::new_v4().to_string(), "number": 0, "length": 30}],
            }],
        }],
        "filterParameterSets": [{
            "uuid": set_id.to_string(),
            "parameters": [{"uuid": Uuid::new_v4().to_string(), "name": "error", "type": "fehler", "value": 1}],
        }],
    });

    let product = Product::from_json(document.as_object().unwrap()).unwrap();
    let seam = &product.all_real_seams()[0];
    assert_eq!(seam.task().errors()[0].threshold(), 4.5);
    assert_eq!(seam.intervals()[0].length(), 30);

    let written = product.to_json();
    let seam_json = &written["seamSeries"][0]["seams"][0];
    assert_eq!(seam_json["sumError"][0]["threshold"], json!(4.5));
    assert!(seam_json["sumError"][0].get("length").is_none());
    assert_eq!(seam_json["seamIntervals"][0]["length"], json!("30"));
    assert_eq!(written["filterParameterSets"][0]["parameters"][0]["type"], json!("error"));
}

#[test]
fn test_lazy_load_and_save_in_place() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("housing.json");
    let product = populated_product();
    product.save(&path).unwrap();

    let mut lazy = Product::load_lazy(&path).unwrap();
    assert!(lazy.filter_parameter_sets().is_empty());
    let seam_set = lazy.all_real_seams()[0].task().graph_param_set();
    assert!(lazy.contains_filter_parameter_set(&seam_set));
    assert!(matches!(lazy.save_in_place(), Err(Error::InvalidInput(_))));

    assert!(lazy.ensure_filter_parameter_set_loaded(&seam_set).unwrap());
    assert_eq!(lazy.filter_parameter_set(&seam_set).unwrap().parameters().len(), 1);
    lazy.ensure_all_filter_parameter_sets_loaded().unwrap();
    assert_eq!(lazy.save_in_place().unwrap(), path);
    assert_eq!(Product::load(&path).unwrap().to_json(), product.to_json());
}

#[test]
fn test_document_that_is_not_a_product() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("other.json");
    std::fs::write(&path, r#"{"name": "no uuid"}"#).unwrap();
    assert!(matches!(Product::load(&path), Err(Error::InvalidDocument(_))));

    std::fs::write(&path, "[1, 2]").unwrap();
    assert!(matches!(Product::load(&path), Err(Error::InvalidDocument(_))));

    std::fs::write(&path, "{ broken").unwrap();
    assert!(matches!(Product::load(&path), Err(Error::Json(_))));
}
