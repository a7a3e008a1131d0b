//! Draw commands: the two drawing operations a board understands.
//!
//! The server describes drawing in three places, with two different shapes:
//!
//! - `line` / `fill` messages carry a bare [`LineData`] / [`FillData`].
//! - The `drawing` message carries a list of *flat* elements, where the
//!   kind sits next to the coordinates: `{"type":"line","fromX":..}`.
//! - The `ready` message's `currentDrawing` carries *tagged* elements,
//!   where the coordinates are nested: `{"type":"line","data":{..}}`.
//!
//! Both list shapes are decoded by [`decode_drawing`], which turns each
//! element into a validated [`DrawCommand`] or fails the whole list.

use serde::{Deserialize, Serialize};

use crate::{ProtocolError, Rgb};

/// A point on the board, in board coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Which operation a [`DrawCommand`] performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawKind {
    Line,
    Fill,
}

/// A validated drawing operation.
///
/// Fields are private so a command can only be built through
/// [`DrawCommand::line`] or [`DrawCommand::fill`], which enforce:
///
/// - a line has a width greater than `f32::EPSILON`;
/// - all coordinates are finite.
///
/// For a fill, the end point and line width are not meaningful;
/// [`DrawCommand::to`] returns `None`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCommand {
    kind: DrawKind,
    from: Point,
    to: Point,
    color: Rgb,
    line_width: f32,
}

impl DrawCommand {
    /// Builds a line command.
    ///
    /// # Errors
    /// Returns `ProtocolError::InvalidDrawCommand` if `line_width` is not
    /// greater than `f32::EPSILON` or a coordinate is not finite.
    pub fn line(
        from: Point,
        to: Point,
        color: Rgb,
        line_width: f32,
    ) -> Result<Self, ProtocolError> {
        if !line_width.is_finite() || line_width <= f32::EPSILON {
            return Err(ProtocolError::InvalidDrawCommand(format!(
                "line width must be positive, got {line_width}"
            )));
        }
        if !from.is_finite() || !to.is_finite() {
            return Err(ProtocolError::InvalidDrawCommand(
                "line coordinates must be finite".into(),
            ));
        }
        Ok(Self { kind: DrawKind::Line, from, to, color, line_width })
    }

    /// Builds a fill command at `at`.
    ///
    /// # Errors
    /// Returns `ProtocolError::InvalidDrawCommand` if a coordinate is not
    /// finite.
    pub fn fill(at: Point, color: Rgb) -> Result<Self, ProtocolError> {
        if !at.is_finite() {
            return Err(ProtocolError::InvalidDrawCommand(
                "fill coordinates must be finite".into(),
            ));
        }
        Ok(Self { kind: DrawKind::Fill, from: at, to: at, color, line_width: 0.0 })
    }

    pub fn kind(&self) -> DrawKind {
        self.kind
    }

    /// Start point of a line, or the seed point of a fill.
    pub fn from(&self) -> Point {
        self.from
    }

    /// End point; only lines have one.
    pub fn to(&self) -> Option<Point> {
        match self.kind {
            DrawKind::Line => Some(self.to),
            DrawKind::Fill => None,
        }
    }

    pub fn color(&self) -> Rgb {
        self.color
    }

    /// Stroke width; `0.0` for fills.
    pub fn line_width(&self) -> f32 {
        self.line_width
    }
}

// ---------------------------------------------------------------------------
// Wire shapes
// ---------------------------------------------------------------------------

/// Wire form of a line, as carried by `line` messages (both directions).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineData {
    pub from_x: f32,
    pub from_y: f32,
    pub to_x: f32,
    pub to_y: f32,
    pub color: Rgb,
    pub line_width: f32,
}

/// Wire form of a fill, as carried by `fill` messages (both directions).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FillData {
    pub x: f32,
    pub y: f32,
    pub color: Rgb,
}

impl TryFrom<LineData> for DrawCommand {
    type Error = ProtocolError;

    fn try_from(data: LineData) -> Result<Self, Self::Error> {
        DrawCommand::line(
            Point::new(data.from_x, data.from_y),
            Point::new(data.to_x, data.to_y),
            data.color,
            data.line_width,
        )
    }
}

impl TryFrom<FillData> for DrawCommand {
    type Error = ProtocolError;

    fn try_from(data: FillData) -> Result<Self, Self::Error> {
        DrawCommand::fill(Point::new(data.x, data.y), data.color)
    }
}

impl DrawCommand {
    /// Wire form of a line command. `None` for fills.
    pub fn to_line_data(&self) -> Option<LineData> {
        (self.kind == DrawKind::Line).then(|| self.wire_line())
    }

    /// Wire form of a fill command. `None` for lines.
    pub fn to_fill_data(&self) -> Option<FillData> {
        (self.kind == DrawKind::Fill).then(|| self.wire_fill())
    }

    pub(crate) fn wire_line(&self) -> LineData {
        LineData {
            from_x: self.from.x,
            from_y: self.from.y,
            to_x: self.to.x,
            to_y: self.to.y,
            color: self.color,
            line_width: self.line_width,
        }
    }

    pub(crate) fn wire_fill(&self) -> FillData {
        FillData {
            x: self.from.x,
            y: self.from.y,
            color: self.color,
        }
    }
}

// ---------------------------------------------------------------------------
// Drawing lists
// ---------------------------------------------------------------------------

/// The two element shapes a drawing list can use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawingShape {
    /// `{"type":"line","data":{"fromX":..}}`, used by `ready`.
    Tagged,
    /// `{"type":"line","fromX":..}`, used by `drawing`.
    Flat,
}

#[derive(Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "kebab-case")]
enum TaggedElement {
    Line(LineData),
    Fill(FillData),
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
enum FlatElement {
    Line(LineData),
    Fill(FillData),
}

/// Decodes a list of drawing elements into validated commands.
///
/// The list is all-or-nothing: an element with an unknown kind, a missing
/// field, or invalid values fails the whole list, so a caller never
/// applies half a drawing.
///
/// # Errors
/// Returns `ProtocolError::InvalidMessage` naming the offending index.
pub fn decode_drawing(
    elements: &[serde_json::Value],
    shape: DrawingShape,
) -> Result<Vec<DrawCommand>, ProtocolError> {
    elements
        .iter()
        .enumerate()
        .map(|(index, element)| {
            let decoded = match shape {
                DrawingShape::Tagged => TaggedElement::deserialize(element).map(|e| match e {
                    TaggedElement::Line(line) => DrawCommand::try_from(line),
                    TaggedElement::Fill(fill) => DrawCommand::try_from(fill),
                }),
                DrawingShape::Flat => FlatElement::deserialize(element).map(|e| match e {
                    FlatElement::Line(line) => DrawCommand::try_from(line),
                    FlatElement::Fill(fill) => DrawCommand::try_from(fill),
                }),
            };
            match decoded {
                Ok(Ok(command)) => Ok(command),
                Ok(Err(e)) => Err(ProtocolError::InvalidMessage(format!(
                    "drawing element {index}: {e}"
                ))),
                Err(e) => Err(ProtocolError::InvalidMessage(format!(
                    "drawing element {index}: {e}"
                ))),
            }
        })
        .collect()
}
