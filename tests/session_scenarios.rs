use image::{Rgba, RgbaImage};
use rasteredit::io::{LoadOptions, session_from_image};
use rasteredit::{
    Command, EditError, EditorSession, Effect, HistogramSet, Operation, PixelRect, SelectionRect,
    parse_op,
};

fn gradient(w: u32, h: u32) -> RgbaImage {
    RgbaImage::from_fn(w, h, |x, y| {
        Rgba([(x * 2) as u8, (y * 2) as u8, ((x * y) % 256) as u8, (100 + x % 100) as u8])
    })
}

fn select(session: &mut EditorSession, x: i32, y: i32, w: i32, h: i32) {
    session.run(Command::drag(x, y, x + w, y + h)).unwrap();
}

fn region_of(session: &EditorSession, rect: PixelRect) -> Vec<u8> {
    session.surface().read_region(rect).as_raw().to_vec()
}

#[test]
fn finished_drag_is_normalized_in_every_direction() {
    let drags = [(10, 10, 30, 40), (30, 40, 10, 10), (30, 10, 10, 40), (10, 40, 30, 10)];
    for (sx, sy, cx, cy) in drags {
        let mut s = EditorSession::new(gradient(50, 50));
        s.run(Command::drag(sx, sy, cx, cy)).unwrap();
        let sel = s.selection().unwrap();
        assert_eq!(sel, SelectionRect::new(sx.min(cx), sy.min(cy), 20, 30));
        assert!(sel.is_normalized());
    }
}

#[test]
fn grayscale_twice_matches_once() {
    let mut once = EditorSession::new(gradient(40, 40));
    select(&mut once, 5, 5, 20, 20);
    once.dispatch(Command::ApplyEffect(Effect::Grayscale)).unwrap();

    let mut twice = once.clone();
    select(&mut twice, 5, 5, 20, 20);
    twice.dispatch(Command::ApplyEffect(Effect::Grayscale)).unwrap();

    assert_eq!(once.surface(), twice.surface());
}

#[test]
fn invert_twice_restores_samples() {
    let img = gradient(40, 40);
    let mut s = EditorSession::new(img.clone());
    for _ in 0..2 {
        select(&mut s, 3, 7, 25, 11);
        s.dispatch(Command::ApplyEffect(Effect::Invert)).unwrap();
    }
    assert_eq!(s.surface().as_image(), &img);
}

#[test]
fn histogram_channels_sum_to_pixel_count() {
    let mut s = EditorSession::new(gradient(64, 64));
    select(&mut s, 4, 9, 33, 17);
    let hist = s.histogram().unwrap();
    let expected = 33 * 17;
    assert_eq!(hist.red.iter().sum::<u32>(), expected);
    assert_eq!(hist.green.iter().sum::<u32>(), expected);
    assert_eq!(hist.blue.iter().sum::<u32>(), expected);

    let rect = PixelRect { x: 4, y: 9, width: 33, height: 17 };
    let direct = HistogramSet::from_region(&s.surface().read_region(rect));
    assert_eq!(&direct, hist);
}

#[test]
fn crop_keeps_selected_samples() {
    let mut s = EditorSession::new(gradient(100, 100));
    let rect = PixelRect { x: 10, y: 10, width: 20, height: 30 };
    let expected = region_of(&s, rect);

    select(&mut s, 10, 10, 20, 30);
    s.dispatch(Command::Crop).unwrap();

    assert_eq!(s.surface().dimensions(), (20, 30));
    assert_eq!(s.surface().as_image().as_raw(), &expected);
    assert_eq!(s.selection(), None);
}

#[test]
fn load_then_scale_preserves_aspect() {
    let mut s = session_from_image(gradient(300, 200), &LoadOptions::default()).unwrap();
    assert_eq!(s.surface().dimensions(), (120, 80));

    s.dispatch(Command::Scale { width: Some(150), height: None }).unwrap();
    assert_eq!(s.surface().dimensions(), (150, 100));

    let err = s.dispatch(Command::Scale { width: None, height: Some(0) }).unwrap_err();
    assert!(matches!(err, EditError::InvalidScaleInput));
    assert_eq!(s.surface().dimensions(), (150, 100));
}

#[test]
fn delete_whites_out_and_keeps_alpha() {
    let img = gradient(30, 30);
    let mut s = EditorSession::new(img.clone());
    select(&mut s, 25, 20, -15, -12);
    s.dispatch(Command::Delete).unwrap();

    for y in 8..20 {
        for x in 10..25 {
            let p = s.surface().as_image().get_pixel(x, y);
            assert_eq!(&p.0[..3], &[255, 255, 255]);
            assert_eq!(p.0[3], img.get_pixel(x, y).0[3]);
        }
    }
    assert_eq!(s.surface().as_image().get_pixel(9, 8), img.get_pixel(9, 8));
    assert_eq!(s.restore_log().len(), 1);
}

#[test]
fn null_selection_rejects_without_mutation() {
    let mut s = EditorSession::new(gradient(20, 20));
    let before = s.clone();
    let cases = [
        (Command::Crop, Operation::Crop),
        (Command::ApplyEffect(Effect::Sepia), Operation::Effect),
        (Command::Delete, Operation::Delete),
    ];
    for (cmd, op) in cases {
        match s.dispatch(cmd) {
            Err(EditError::MissingSelection(got)) => assert_eq!(got, op),
            other => panic!("expected missing selection, got {:?}", other),
        }
    }
    assert_eq!(s.surface(), before.surface());
    assert_eq!(s.base(), before.base());
    assert!(s.restore_log().is_empty());
}

#[test]
fn parsed_ops_drive_a_session() {
    let mut commands = Vec::new();
    for op in ["select:0,0,10,10", "delete", "select:10,0,10,10", "effect:invert", "restore"] {
        commands.extend(parse_op(op).unwrap());
    }
    let img = gradient(20, 10);
    let mut s = EditorSession::new(img.clone());
    s.run(commands).unwrap();

    assert_eq!(s.surface().as_image().get_pixel(3, 3), img.get_pixel(3, 3));
    let inverted = s.surface().as_image().get_pixel(12, 3);
    let original = img.get_pixel(12, 3);
    assert_eq!(inverted.0[0], 255 - original.0[0]);
    assert_eq!(inverted.0[3], original.0[3]);
    assert!(s.restore_log().is_empty());
}
