use super::*;
use crate::foundation::rng::{CountingRng, seeded_rng};
use crate::script::parser::{parse_expression, parse_statements};

fn ramp(h: u32, w: u32, c: usize) -> ImageArray {
    let data = (0..h as usize * w as usize * c).map(|i| (i % 256) as u8).collect();
    ImageArray::new(h, w, c, data).unwrap()
}

fn scope_with(img: ImageArray) -> Scope {
    let mut scope = Scope::new();
    scope.insert("img".to_owned(), Value::Image(img));
    scope
}

fn eval_in(scope: &mut Scope, src: &str) -> Result<Value, ScriptError> {
    let registry = FunctionRegistry::standard();
    let mut rng = seeded_rng(0);
    let expr = parse_expression(src, 0).unwrap();
    Interpreter::new(&registry, scope, &mut rng).eval(&expr)
}

fn exec_in(scope: &mut Scope, src: &str) -> Result<(), ScriptError> {
    let registry = FunctionRegistry::standard();
    let mut rng = seeded_rng(0);
    let stmts = parse_statements(src, 0).unwrap();
    let mut interp = Interpreter::new(&registry, scope, &mut rng);
    for s in &stmts {
        interp.exec(s)?;
    }
    Ok(())
}

#[test]
fn numeric_and_boolean_operators() {
    let mut scope = Scope::new();
    assert_eq!(eval_in(&mut scope, "1 + 2 * 3").unwrap(), Value::Num(7.0));
    assert_eq!(eval_in(&mut scope, "-7 % 3").unwrap(), Value::Num(2.0));
    assert_eq!(eval_in(&mut scope, "1 < 2 && !false").unwrap(), Value::Bool(true));
    assert_eq!(eval_in(&mut scope, "1 == 2 || 3 >= 3").unwrap(), Value::Bool(true));
    assert_eq!(eval_in(&mut scope, "2 > 1 ? 10 : 20").unwrap(), Value::Num(10.0));
    assert!(eval_in(&mut scope, "1 / 0").is_err());
}

#[test]
fn short_circuit_skips_right_side() {
    let mut scope = Scope::new();
    // The right-hand side would fail with an unknown variable.
    assert_eq!(eval_in(&mut scope, "false && missing").unwrap(), Value::Bool(false));
    assert_eq!(eval_in(&mut scope, "true || missing").unwrap(), Value::Bool(true));
}

#[test]
fn conditional_only_evaluates_chosen_branch() {
    let registry = FunctionRegistry::standard();
    let mut scope = scope_with(ramp(8, 8, 3));
    let mut rng = CountingRng::new(seeded_rng(1));
    let expr = parse_expression("false ? random_brightness(img) : img", 0).unwrap();
    Interpreter::new(&registry, &mut scope, &mut rng)
        .eval(&expr)
        .unwrap();
    assert_eq!(rng.draws(), 0);
}

#[test]
fn crop_keeps_rows_from_offset() {
    let img = ramp(100, 100, 3);
    let mut scope = scope_with(img.clone());
    let out = eval_in(&mut scope, "img[10:]").unwrap().into_image().unwrap();
    assert_eq!(out.shape(), (90, 100, 3));
    assert_eq!(out.pixel(0, 0), img.pixel(10, 0));
}

#[test]
fn column_crop_and_channel_pick() {
    let img = ramp(4, 6, 3);
    let mut scope = scope_with(img.clone());
    let cols = eval_in(&mut scope, "img[:, 2:, :]").unwrap().into_image().unwrap();
    assert_eq!(cols.shape(), (4, 4, 3));
    assert_eq!(cols.pixel(1, 0), img.pixel(1, 2));

    let red = eval_in(&mut scope, "img[:, :, 2]").unwrap().into_image().unwrap();
    assert_eq!(red.shape(), (4, 6, 1));
    assert_eq!(red.get(3, 5, 0), img.get(3, 5, 2));

    let reversed = eval_in(&mut scope, "img[:, :, ::-1]").unwrap().into_image().unwrap();
    assert_eq!(reversed, img.swap_red_blue());
}

#[test]
fn integer_row_index_keeps_axis() {
    let mut scope = scope_with(ramp(5, 3, 1));
    let row = eval_in(&mut scope, "img[-1]").unwrap().into_image().unwrap();
    assert_eq!(row.shape(), (1, 3, 1));
}

#[test]
fn bad_selections_report_errors() {
    let mut scope = scope_with(ramp(5, 3, 3));
    assert!(eval_in(&mut scope, "img[5]").is_err());
    assert!(eval_in(&mut scope, "img[10:]").is_err());
    assert!(eval_in(&mut scope, "img[:, :, 0:2]").is_err());
    assert!(eval_in(&mut scope, "img[::0]").is_err());
    assert!(eval_in(&mut scope, "img[0.5]").is_err());
}

#[test]
fn attributes_report_shape() {
    let mut scope = scope_with(ramp(5, 7, 3));
    assert_eq!(eval_in(&mut scope, "img.height").unwrap(), Value::Num(5.0));
    assert_eq!(eval_in(&mut scope, "img.width").unwrap(), Value::Num(7.0));
    assert_eq!(eval_in(&mut scope, "img.channels").unwrap(), Value::Num(3.0));
    assert!(eval_in(&mut scope, "img.depth").is_err());
}

#[test]
fn image_arithmetic_saturates() {
    let mut scope = scope_with(ImageArray::filled(2, 2, 1, 200).unwrap());
    let plus = eval_in(&mut scope, "img + 100").unwrap().into_image().unwrap();
    assert!(plus.data().iter().all(|&v| v == 255));
    let minus = eval_in(&mut scope, "50 - img").unwrap().into_image().unwrap();
    assert!(minus.data().iter().all(|&v| v == 0));
    let half = eval_in(&mut scope, "img / 2").unwrap().into_image().unwrap();
    assert!(half.data().iter().all(|&v| v == 100));
    let doubled = eval_in(&mut scope, "img + img").unwrap().into_image().unwrap();
    assert!(doubled.data().iter().all(|&v| v == 255));
    assert!(eval_in(&mut scope, "img / 0").is_err());
    assert!(eval_in(&mut scope, "img * img").is_err());
}

#[test]
fn image_ops_need_matching_shapes() {
    let mut scope = scope_with(ramp(4, 4, 3));
    assert!(eval_in(&mut scope, "img + img[1:]").is_err());
}

#[test]
fn statements_fill_and_paste_regions() {
    let mut scope = scope_with(ImageArray::filled(4, 4, 3, 10).unwrap());
    exec_in(&mut scope, "img[0:2, :, :] = 255; img[:, 3] = img[:, 0] * 0 + 7").unwrap();
    let img = scope["img"].as_image().unwrap();
    assert_eq!(img.pixel(0, 0), &[255, 255, 255]);
    assert_eq!(img.pixel(3, 0), &[10, 10, 10]);
    assert_eq!(img.pixel(3, 3), &[7, 7, 7]);
    assert_eq!(img.pixel(1, 3), &[7, 7, 7]);
}

#[test]
fn statements_create_variables() {
    let mut scope = scope_with(ramp(4, 4, 1));
    exec_in(&mut scope, "n = 2 + 3; flipped = hflip(img)").unwrap();
    assert_eq!(scope["n"], Value::Num(5.0));
    assert!(matches!(scope["flipped"], Value::Image(_)));
}

#[test]
fn paste_shape_mismatch_is_an_error() {
    let mut scope = scope_with(ramp(4, 4, 3));
    let err = exec_in(&mut scope, "img[0:2] = img").unwrap_err();
    assert!(err.message().contains("paste"));
}

#[test]
fn unknown_names_report_offsets() {
    let mut scope = scope_with(ramp(2, 2, 1));
    let err = eval_in(&mut scope, "img + nope").unwrap_err();
    assert_eq!(err.offset(), 6);
    let err = eval_in(&mut scope, "  nope(img)").unwrap_err();
    assert_eq!(err.offset(), 2);
    assert!(err.message().contains("unknown function"));
}

#[test]
fn type_errors_are_located_at_operator() {
    let mut scope = Scope::new();
    let err = eval_in(&mut scope, "1 + true").unwrap_err();
    assert_eq!(err.offset(), 2);
}
