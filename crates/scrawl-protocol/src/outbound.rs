//! Messages the client sends to the server.

use serde::Serialize;

use crate::{DrawCommand, DrawKind, FillData, LineData};

/// Every message the client can send.
///
/// Serialized as an adjacently tagged enum, which yields the lobby's
/// envelope shape directly:
///
/// ```text
/// OutboundMessage::Message("hi".into())  →  {"type":"message","data":"hi"}
/// OutboundMessage::Start                 →  {"type":"start"}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "kebab-case")]
pub enum OutboundMessage {
    /// Owner only: start the game.
    Start,
    Line(LineData),
    Fill(FillData),
    ClearDrawingBoard,
    /// A chat line or guess.
    Message(String),
    /// Index into the words offered by `your-turn`.
    ChooseWord(usize),
    NameChange(String),
    /// Ask the server to resend the whole drawing.
    RequestDrawing,
    /// Vote to kick the player with this ID.
    KickVote(String),
    KeepAlive,
}

impl OutboundMessage {
    /// The envelope `type` this message is sent as.
    pub fn kind(&self) -> &'static str {
        match self {
            OutboundMessage::Start => "start",
            OutboundMessage::Line(_) => "line",
            OutboundMessage::Fill(_) => "fill",
            OutboundMessage::ClearDrawingBoard => "clear-drawing-board",
            OutboundMessage::Message(_) => "message",
            OutboundMessage::ChooseWord(_) => "choose-word",
            OutboundMessage::NameChange(_) => "name-change",
            OutboundMessage::RequestDrawing => "request-drawing",
            OutboundMessage::KickVote(_) => "kick-vote",
            OutboundMessage::KeepAlive => "keep-alive",
        }
    }
}

impl From<DrawCommand> for OutboundMessage {
    fn from(command: DrawCommand) -> Self {
        match command.kind() {
            DrawKind::Line => OutboundMessage::Line(command.wire_line()),
            DrawKind::Fill => OutboundMessage::Fill(command.wire_fill()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Rgb;
    use serde_json::{Value, json};

    fn to_value(message: &OutboundMessage) -> Value {
        serde_json::to_value(message).unwrap()
    }

    #[test]
    fn test_unit_messages_have_no_data() {
        assert_eq!(to_value(&OutboundMessage::Start), json!({"type":"start"}));
        assert_eq!(
            to_value(&OutboundMessage::ClearDrawingBoard),
            json!({"type":"clear-drawing-board"})
        );
    }

    #[test]
    fn test_payload_messages_nest_under_data() {
        assert_eq!(
            to_value(&OutboundMessage::Message("hi".into())),
            json!({"type":"message","data":"hi"})
        );
        assert_eq!(
            to_value(&OutboundMessage::ChooseWord(2)),
            json!({"type":"choose-word","data":2})
        );
        let fill = OutboundMessage::Fill(FillData { x: 1.0, y: 2.0, color: Rgb::new(0, 0, 255) });
        assert_eq!(
            to_value(&fill),
            json!({"type":"fill","data":{"x":1.0,"y":2.0,"color":"#0000FF"}})
        );
    }

    #[test]
    fn test_draw_command_becomes_line_or_fill() {
        use crate::Point;

        let line =
            DrawCommand::line(Point::new(0.0, 1.0), Point::new(2.0, 3.0), Rgb::BLACK, 4.0).unwrap();
        assert_eq!(
            to_value(&OutboundMessage::from(line)),
            json!({"type":"line","data":{"fromX":0.0,"fromY":1.0,"toX":2.0,"toY":3.0,"color":"#000000","lineWidth":4.0}})
        );
        let fill = DrawCommand::fill(Point::new(5.0, 6.0), Rgb::WHITE).unwrap();
        assert_eq!(OutboundMessage::from(fill).kind(), "fill");
    }

    #[test]
    fn test_kind_matches_serialized_type() {
        let messages = [
            OutboundMessage::Start,
            OutboundMessage::RequestDrawing,
            OutboundMessage::KickVote("p2".into()),
            OutboundMessage::NameChange("Bob".into()),
            OutboundMessage::KeepAlive,
        ];
        for message in &messages {
            assert_eq!(to_value(message)["type"], message.kind());
        }
    }
}
