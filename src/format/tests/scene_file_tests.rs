//! Tests for structural decoding of scene files.

use serde_json::{Value, json};

use super::test_raster;
use crate::format::{DecodeError, EncodeError, SCENE_VERSION, SceneFile, decode_scene, encode_scene};
use crate::model::{CanvasFormat, Color, ItemId, ItemKind, Point, Scene, SceneItem};

fn item_json(id: ItemId) -> Value {
    json!({
        "id": id,
        "type": "text",
        "position": { "x": 10.0, "y": 20.0 },
        "size": { "width": 200.0, "height": 200.0 },
        "rotationDegrees": 0.0,
        "zIndex": 0.0,
        "text": "Hello",
        "font": "Helvetica",
        "fontSize": 24.0,
        "textColor": { "red": 0.0, "green": 0.0, "blue": 0.0, "opacity": 1.0 }
    })
}

fn scene_json(items: Vec<Value>) -> Value {
    json!({
        "version": SCENE_VERSION,
        "items": items,
        "background": { "red": 1.0, "green": 1.0, "blue": 1.0, "opacity": 1.0 },
        "format": "Portrait"
    })
}

fn decode_value(value: &Value) -> Result<Scene, DecodeError> {
    decode_scene(&serde_json::to_vec(value).unwrap())
}

#[test]
fn test_minimal_scene_decodes() {
    let id = ItemId::new();
    let scene = decode_value(&scene_json(vec![item_json(id)])).unwrap();

    assert_eq!(scene.format, CanvasFormat::Portrait);
    assert_eq!(scene.background, Color::WHITE);
    assert!(scene.background_image.is_none());
    assert_eq!(scene.len(), 1);
    assert_eq!(scene.items()[0].id(), id);
    assert_eq!(scene.items()[0].position, Point::new(10.0, 20.0));
}

#[test]
fn test_missing_version_is_current() {
    let mut value = scene_json(vec![]);
    value.as_object_mut().unwrap().remove("version");
    assert!(decode_value(&value).is_ok());
}

#[test]
fn test_newer_major_version_rejected() {
    let mut value = scene_json(vec![]);
    value["version"] = json!("2.0");
    assert!(matches!(
        decode_value(&value),
        Err(DecodeError::UnsupportedVersion { .. })
    ));
}

#[test]
fn test_missing_items_named() {
    let mut value = scene_json(vec![]);
    value.as_object_mut().unwrap().remove("items");
    let err = decode_value(&value).unwrap_err();
    assert_eq!(err.field(), Some("items"));
}

#[test]
fn test_first_bad_item_named() {
    let mut broken = item_json(ItemId::new());
    broken.as_object_mut().unwrap().remove("size");
    let mut also_broken = item_json(ItemId::new());
    also_broken.as_object_mut().unwrap().remove("position");

    let value = scene_json(vec![item_json(ItemId::new()), broken, also_broken]);
    let err = decode_value(&value).unwrap_err();

    assert_eq!(err.field(), Some("items[1]"));
    assert!(err.to_string().contains("size"), "{err}");
}

#[test]
fn test_unknown_item_type_rejected() {
    let mut sticker = item_json(ItemId::new());
    sticker["type"] = json!("sticker");
    let err = decode_value(&scene_json(vec![sticker])).unwrap_err();
    assert_eq!(err.field(), Some("items[0]"));
}

#[test]
fn test_bad_format_named() {
    let mut value = scene_json(vec![]);
    value["format"] = json!("Panorama");
    let err = decode_value(&value).unwrap_err();
    assert_eq!(err.field(), Some("format"));
}

#[test]
fn test_bad_background_named() {
    let mut value = scene_json(vec![]);
    value["background"] = json!(0xffffff);
    let err = decode_value(&value).unwrap_err();
    assert_eq!(err.field(), Some("background"));
}

#[test]
fn test_duplicate_item_ids_rejected() {
    let id = ItemId::new();
    let err = decode_value(&scene_json(vec![item_json(id), item_json(id)])).unwrap_err();
    assert_eq!(err.field(), Some("items[1].id"));
}

#[test]
fn test_not_json_is_syntax_error() {
    assert!(matches!(
        decode_scene(b"{ items: nope"),
        Err(DecodeError::Syntax(_))
    ));
}

#[test]
fn test_corrupt_images_degrade_to_absent() {
    let mut photo = item_json(ItemId::new());
    let object = photo.as_object_mut().unwrap();
    for key in ["text", "font", "fontSize", "textColor"] {
        object.remove(key);
    }
    object.insert("type".into(), json!("photo"));
    object.insert("imageData".into(), json!("AAECAwQFBgc="));
    object.insert("borderWidth".into(), json!(2.0));
    object.insert(
        "borderColor".into(),
        json!({ "red": 1.0, "green": 0.0, "blue": 0.0, "opacity": 1.0 }),
    );
    object.insert("hasBackground".into(), json!(false));

    let mut value = scene_json(vec![photo, item_json(ItemId::new())]);
    value["backgroundImageData"] = json!("%%% not base64 %%%");

    let scene = decode_value(&value).unwrap();
    assert_eq!(scene.len(), 2);
    assert!(scene.items()[0].is_photo());
    assert!(scene.items()[0].photo_image().is_none());
    assert!(scene.background_image.is_none());
}

#[test]
fn test_null_background_image_is_absent() {
    let mut value = scene_json(vec![]);
    value["backgroundImageData"] = Value::Null;
    assert!(decode_value(&value).unwrap().background_image.is_none());
}

#[test]
fn test_written_layout() {
    let mut scene = Scene::new(CanvasFormat::Story);
    scene
        .add_item(SceneItem::new_photo(test_raster(16, 16)))
        .unwrap();
    scene.add_item(SceneItem::new_text()).unwrap();

    let bytes = encode_scene(&scene, 80).unwrap();
    let value: Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(value["format"], json!("Story"));
    assert_eq!(value["items"][0]["type"], json!("photo"));
    assert!(value["items"][0]["imageData"].is_string());
    assert!(value["items"][0].get("text").is_none());
    assert_eq!(value["items"][1]["type"], json!("text"));
    assert!(value["items"][1].get("borderWidth").is_none());
    assert!(value["items"][1]["rotationDegrees"].is_number());
    assert!(value.get("backgroundImageData").is_none());
    assert_eq!(value["background"]["opacity"], json!(1.0));
}

#[test]
fn test_non_finite_geometry_is_encode_error() {
    let mut scene = Scene::default();
    let mut item = SceneItem::new_text();
    item.set_position(Point::new(f64::NAN, 1.0));
    scene.add_item(item).unwrap();

    assert!(matches!(
        SceneFile::from_scene(&scene, 80),
        Err(EncodeError::NonFinite { field }) if field == "items[0]"
    ));
}

fn non_finite_field(scene: &Scene) -> Option<String> {
    match encode_scene(scene, 80) {
        Err(EncodeError::NonFinite { field }) => Some(field),
        _ => None,
    }
}

#[test]
fn test_non_finite_font_size_is_encode_error() {
    let mut scene = Scene::default();
    scene.add_item(SceneItem::new_photo(test_raster(4, 4))).unwrap();
    let mut text = SceneItem::new_text();
    if let ItemKind::Text(style) = text.kind_mut() {
        style.font_size = f64::NAN;
    }
    scene.add_item(text).unwrap();

    assert_eq!(non_finite_field(&scene).as_deref(), Some("items[1].fontSize"));
}

#[test]
fn test_non_finite_text_color_is_encode_error() {
    let mut scene = Scene::default();
    let mut text = SceneItem::new_text();
    if let ItemKind::Text(style) = text.kind_mut() {
        style.text_color.opacity = f64::NEG_INFINITY;
    }
    scene.add_item(text).unwrap();

    assert_eq!(non_finite_field(&scene).as_deref(), Some("items[0].textColor"));
}

#[test]
fn test_non_finite_border_is_encode_error() {
    let mut width = SceneItem::new_photo(test_raster(4, 4));
    if let ItemKind::Photo(style) = width.kind_mut() {
        style.border_width = f64::INFINITY;
    }
    let mut scene = Scene::default();
    scene.add_item(width).unwrap();
    assert_eq!(non_finite_field(&scene).as_deref(), Some("items[0].borderWidth"));

    let mut color = SceneItem::new_photo(test_raster(4, 4));
    if let ItemKind::Photo(style) = color.kind_mut() {
        style.border_color.green = f64::NAN;
    }
    let mut scene = Scene::default();
    scene.add_item(color).unwrap();
    assert_eq!(non_finite_field(&scene).as_deref(), Some("items[0].borderColor"));
}

#[test]
fn test_non_finite_background_is_encode_error() {
    let mut scene = Scene::default();
    scene.background.red = f64::INFINITY;

    assert_eq!(non_finite_field(&scene).as_deref(), Some("background"));
}

#[test]
fn test_finite_styles_still_decode() {
    let mut scene = Scene::default();
    scene.background = Color::rgba(0.2, 0.4, 0.6, 0.8);
    let mut text = SceneItem::new_text();
    if let ItemKind::Text(style) = text.kind_mut() {
        style.font_size = 36.5;
    }
    scene.add_item(text).unwrap();

    let decoded = decode_scene(&encode_scene(&scene, 80).unwrap()).unwrap();
    assert_eq!(decoded, scene);
}
