// ============================================================================
// COMMANDS — one variant per user action, plus the textual form used by the CLI
// ============================================================================
//
// Grammar (one operation per string):
//   down:X,Y   move:X,Y   up
//   drag:SX,SY,CX,CY          → down + move + up
//   select:X,Y,W,H            → drag from (X,Y) to (X+W,Y+H)
//   deselect   crop   delete   restore
//   effect:grayscale|sepia|invert
//   scale:W,H                 (leave one side empty, e.g. "scale:150,")
//   text:X,Y,SIZE,COLOR,TEXT  (TEXT may contain commas; "\n" starts a new line)

use crate::error::EditError;
use crate::ops::adjustments::Effect;
use crate::ops::text::{TextStyle, parse_color};

/// A single user action applied to an [`crate::session::EditorSession`].
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    PointerDown { x: i32, y: i32 },
    PointerMove { x: i32, y: i32 },
    PointerUp,
    Deselect,
    Crop,
    ApplyEffect(Effect),
    Delete,
    RestoreDeleted,
    Scale { width: Option<u32>, height: Option<u32> },
    AddText(TextStyle),
}

impl Command {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Command::PointerDown { .. } => "pointer-down",
            Command::PointerMove { .. } => "pointer-move",
            Command::PointerUp => "pointer-up",
            Command::Deselect => "deselect",
            Command::Crop => "crop",
            Command::ApplyEffect(_) => "effect",
            Command::Delete => "delete",
            Command::RestoreDeleted => "restore",
            Command::Scale { .. } => "scale",
            Command::AddText(_) => "text",
        }
    }

    /// The pointer events of a drag from `(sx, sy)` to `(cx, cy)`.
    pub fn drag(sx: i32, sy: i32, cx: i32, cy: i32) -> Vec<Command> {
        vec![
            Command::PointerDown { x: sx, y: sy },
            Command::PointerMove { x: cx, y: cy },
            Command::PointerUp,
        ]
    }
}

/// Parse one textual operation into the commands it stands for.
pub fn parse_op(op: &str) -> Result<Vec<Command>, EditError> {
    let invalid = |why: &str| EditError::InvalidCommand(format!("{} ({})", op, why));
    let (name, args) = match op.split_once(':') {
        Some((n, a)) => (n.trim().to_lowercase(), a),
        None => (op.trim().to_lowercase(), ""),
    };

    let commands = match name.as_str() {
        "down" | "move" => {
            let [x, y] = ints::<2>(args).ok_or_else(|| invalid("expected X,Y"))?;
            if name == "down" {
                vec![Command::PointerDown { x, y }]
            } else {
                vec![Command::PointerMove { x, y }]
            }
        }
        "up" => vec![Command::PointerUp],
        "drag" => {
            let [sx, sy, cx, cy] = ints::<4>(args).ok_or_else(|| invalid("expected SX,SY,CX,CY"))?;
            Command::drag(sx, sy, cx, cy)
        }
        "select" => {
            let [x, y, w, h] = ints::<4>(args).ok_or_else(|| invalid("expected X,Y,W,H"))?;
            Command::drag(x, y, x.saturating_add(w), y.saturating_add(h))
        }
        "deselect" => vec![Command::Deselect],
        "crop" => vec![Command::Crop],
        "delete" => vec![Command::Delete],
        "restore" => vec![Command::RestoreDeleted],
        "effect" => vec![Command::ApplyEffect(args.parse()?)],
        "scale" => {
            let (w, h) = args.split_once(',').ok_or_else(|| invalid("expected W,H"))?;
            let width = optional_u32(w).map_err(|_| invalid("width is not a number"))?;
            let height = optional_u32(h).map_err(|_| invalid("height is not a number"))?;
            vec![Command::Scale { width, height }]
        }
        "text" => {
            let parts: Vec<&str> = args.splitn(5, ',').collect();
            let [x, y, size, color, text] = parts[..] else {
                return Err(invalid("expected X,Y,SIZE,COLOR,TEXT"));
            };
            let color = if color.trim().is_empty() {
                [0, 0, 0, 255]
            } else {
                parse_color(color).ok_or_else(|| invalid("bad color"))?
            };
            vec![Command::AddText(TextStyle {
                text: text.replace("\\n", "\n"),
                font_size: optional_u32(size).map_err(|_| invalid("size is not a number"))?,
                color,
                x: optional_u32(x).map_err(|_| invalid("x is not a number"))?,
                y: optional_u32(y).map_err(|_| invalid("y is not a number"))?,
            })]
        }
        _ => return Err(invalid("unknown operation")),
    };
    Ok(commands)
}

/// Exactly `N` comma-separated integers.
fn ints<const N: usize>(args: &str) -> Option<[i32; N]> {
    let mut out = [0i32; N];
    let mut parts = args.split(',');
    for slot in out.iter_mut() {
        *slot = parts.next()?.trim().parse().ok()?;
    }
    if parts.next().is_some() {
        return None;
    }
    Some(out)
}

/// Blank means unset.
fn optional_u32(s: &str) -> Result<Option<u32>, std::num::ParseIntError> {
    let s = s.trim();
    if s.is_empty() { Ok(None) } else { s.parse().map(Some) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drag_expands_to_pointer_events() {
        assert_eq!(parse_op("drag:30,40,10,5").unwrap(), Command::drag(30, 40, 10, 5));
        assert_eq!(parse_op("select:10,10,20,30").unwrap(), Command::drag(10, 10, 30, 40));
    }

    #[test]
    fn scale_accepts_one_blank_side() {
        assert_eq!(
            parse_op("scale:150,").unwrap(),
            vec![Command::Scale { width: Some(150), height: None }]
        );
        assert_eq!(
            parse_op("scale: , 80").unwrap(),
            vec![Command::Scale { width: None, height: Some(80) }]
        );
        assert!(parse_op("scale:150").is_err());
        assert!(parse_op("scale:wide,").is_err());
    }

    #[test]
    fn text_keeps_commas_in_the_message() {
        let cmds = parse_op("text:5,20,16,#ff0000,Hello, world").unwrap();
        let Command::AddText(style) = &cmds[0] else {
            panic!("expected text command");
        };
        assert_eq!(style.text, "Hello, world");
        assert_eq!(style.color, [255, 0, 0, 255]);
        assert_eq!((style.x, style.y, style.font_size), (Some(5), Some(20), Some(16)));
    }

    #[test]
    fn text_blank_fields_stay_unset() {
        let cmds = parse_op("text:,,,,").unwrap();
        assert_eq!(
            cmds,
            vec![Command::AddText(TextStyle {
                text: String::new(),
                font_size: None,
                color: [0, 0, 0, 255],
                x: None,
                y: None,
            })]
        );
    }

    #[test]
    fn simple_ops_and_errors() {
        assert_eq!(parse_op("CROP").unwrap(), vec![Command::Crop]);
        assert_eq!(parse_op("effect:sepia").unwrap(), vec![Command::ApplyEffect(Effect::Sepia)]);
        assert!(matches!(parse_op("effect:blur"), Err(EditError::InvalidCommand(_))));
        assert!(matches!(parse_op("rotate:90"), Err(EditError::InvalidCommand(_))));
        assert!(parse_op("drag:1,2,3").is_err());
        assert!(parse_op("down:1,2,3").is_err());
    }
}
