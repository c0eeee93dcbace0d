//! Cube domain types: faces, colors, moves, and the 54-sticker state.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};
use thiserror::Error;

/// Number of faces.
pub const FACE_COUNT: usize = 6;

/// Stickers per face.
pub const STICKERS_PER_FACE: usize = 9;

/// Stickers on the whole cube.
pub const STICKER_COUNT: usize = FACE_COUNT * STICKERS_PER_FACE;

/// A face of the cube.
///
/// Discriminants are the protocol indices. Both rotation and state decoding
/// go through [`CubeFace::PROTOCOL_ORDER`]; display ordering is a UI concern
/// and lives elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize_repr, Deserialize_repr)]
#[repr(u8)]
pub enum CubeFace {
    /// Back face.
    Back = 0,
    /// Front face.
    Front = 1,
    /// Up face.
    Up = 2,
    /// Down face.
    Down = 3,
    /// Right face.
    Right = 4,
    /// Left face.
    Left = 5,
}

impl CubeFace {
    /// Faces in protocol order; index `i` holds the face with protocol index
    /// `i`.
    pub const PROTOCOL_ORDER: [Self; FACE_COUNT] =
        [Self::Back, Self::Front, Self::Up, Self::Down, Self::Right, Self::Left];

    /// Face for a protocol index.
    pub fn from_protocol_index(index: u8) -> Option<Self> {
        Self::PROTOCOL_ORDER.get(usize::from(index)).copied()
    }

    /// Protocol index of this face.
    pub fn protocol_index(self) -> u8 {
        self as u8
    }

    /// Notation letter (`B`, `F`, `U`, `D`, `R`, `L`).
    pub fn letter(self) -> char {
        match self {
            Self::Back => 'B',
            Self::Front => 'F',
            Self::Up => 'U',
            Self::Down => 'D',
            Self::Right => 'R',
            Self::Left => 'L',
        }
    }

    /// Face for a notation letter.
    pub fn from_letter(letter: char) -> Option<Self> {
        Self::PROTOCOL_ORDER.into_iter().find(|face| face.letter() == letter)
    }

    /// Color every sticker of this face shows on a solved cube.
    pub fn solved_color(self) -> CubeColor {
        CubeColor::PROTOCOL_ORDER[usize::from(self.protocol_index())]
    }
}

/// Sticker color. Discriminants are the protocol byte values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize_repr, Deserialize_repr)]
#[repr(u8)]
pub enum CubeColor {
    /// Solved color of the back face.
    Blue = 0,
    /// Solved color of the front face.
    Green = 1,
    /// Solved color of the up face.
    White = 2,
    /// Solved color of the down face.
    Yellow = 3,
    /// Solved color of the right face.
    Red = 4,
    /// Solved color of the left face.
    Orange = 5,
}

impl CubeColor {
    /// Colors in protocol byte order.
    pub const PROTOCOL_ORDER: [Self; FACE_COUNT] =
        [Self::Blue, Self::Green, Self::White, Self::Yellow, Self::Red, Self::Orange];

    /// Color for a protocol byte. Bytes above 5 are not colors.
    pub fn from_u8(value: u8) -> Option<Self> {
        Self::PROTOCOL_ORDER.get(usize::from(value)).copied()
    }

    /// Protocol byte for this color.
    pub fn to_u8(self) -> u8 {
        self as u8
    }
}

/// Turn direction, viewed facing the turned face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Clockwise.
    Clockwise,
    /// Counter-clockwise (prime).
    CounterClockwise,
}

impl Direction {
    /// The other direction.
    pub fn flipped(self) -> Self {
        match self {
            Self::Clockwise => Self::CounterClockwise,
            Self::CounterClockwise => Self::Clockwise,
        }
    }
}

/// A single quarter turn.
///
/// Notation is always derived from face and direction, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    face: CubeFace,
    direction: Direction,
    center_orientation: Option<u8>,
}

impl Move {
    /// A move with no center orientation.
    pub const fn new(face: CubeFace, direction: Direction) -> Self {
        Self { face, direction, center_orientation: None }
    }

    /// A move carrying the center-orientation byte reported with it.
    pub const fn with_center_orientation(
        face: CubeFace,
        direction: Direction,
        center_orientation: u8,
    ) -> Self {
        Self { face, direction, center_orientation: Some(center_orientation) }
    }

    /// Turned face.
    pub fn face(&self) -> CubeFace {
        self.face
    }

    /// Turn direction.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Center orientation reported with the move, if any.
    pub fn center_orientation(&self) -> Option<u8> {
        self.center_orientation
    }

    /// Standard notation: face letter, plus `'` for counter-clockwise.
    pub fn notation(&self) -> String {
        self.to_string()
    }

    /// The move that undoes this one. Center orientation is dropped since
    /// it describes the original turn.
    pub fn inverted(&self) -> Self {
        Self::new(self.face, self.direction.flipped())
    }

    /// Parse notation such as `R` or `U'`.
    pub fn parse_notation(text: &str) -> Result<Self, ParseMoveError> {
        text.parse()
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.direction {
            Direction::Clockwise => write!(f, "{}", self.face.letter()),
            Direction::CounterClockwise => write!(f, "{}'", self.face.letter()),
        }
    }
}

/// Error parsing move notation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid move notation: {text:?}")]
pub struct ParseMoveError {
    /// The text that failed to parse.
    pub text: String,
}

impl FromStr for Move {
    type Err = ParseMoveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseMoveError { text: s.to_string() };
        let mut chars = s.trim().chars();
        let face = chars.next().and_then(CubeFace::from_letter).ok_or_else(err)?;
        let direction = match chars.next() {
            None => Direction::Clockwise,
            Some('\'') => Direction::CounterClockwise,
            Some(_) => return Err(err()),
        };
        if chars.next().is_some() {
            return Err(err());
        }
        Ok(Self::new(face, direction))
    }
}

/// Ordered move log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveSequence {
    moves: Vec<Move>,
}

impl MoveSequence {
    /// Empty sequence.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a move.
    pub fn push(&mut self, mv: Move) {
        self.moves.push(mv);
    }

    /// Append several moves in order.
    pub fn extend(&mut self, moves: impl IntoIterator<Item = Move>) {
        self.moves.extend(moves);
    }

    /// Remove every move.
    pub fn clear(&mut self) {
        self.moves.clear();
    }

    /// Number of moves.
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    /// True when no moves are recorded.
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// Moves in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Move> {
        self.moves.iter()
    }

    /// Moves as a slice.
    pub fn as_slice(&self) -> &[Move] {
        &self.moves
    }

    /// The sequence that undoes this one: reversed, each move flipped.
    pub fn inverted(&self) -> Self {
        Self { moves: self.moves.iter().rev().map(Move::inverted).collect() }
    }

    /// Space-separated notation, e.g. `R U R' U'`.
    pub fn notation(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for MoveSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, mv) in self.moves.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{mv}")?;
        }
        Ok(())
    }
}

impl FromStr for MoveSequence {
    type Err = ParseMoveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let moves = s.split_whitespace().map(str::parse::<Move>).collect::<Result<_, _>>()?;
        Ok(Self { moves })
    }
}

impl From<Vec<Move>> for MoveSequence {
    fn from(moves: Vec<Move>) -> Self {
        Self { moves }
    }
}

impl<'a> IntoIterator for &'a MoveSequence {
    type Item = &'a Move;
    type IntoIter = std::slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.moves.iter()
    }
}

/// Shape violations when building a [`CubeState`] from untyped parts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CubeShapeError {
    /// Not exactly six faces.
    #[error("expected 6 faces, got {actual}")]
    FaceCount {
        /// Faces supplied.
        actual: usize,
    },

    /// A face without exactly nine stickers.
    #[error("face {face} has {actual} stickers, expected 9")]
    StickerCount {
        /// Protocol index of the face.
        face: usize,
        /// Stickers supplied.
        actual: usize,
    },

    /// Not exactly six center-orientation bytes.
    #[error("expected 6 center orientations, got {actual}")]
    CenterCount {
        /// Bytes supplied.
        actual: usize,
    },
}

/// Full sticker state: 6 faces × 9 stickers plus one center-orientation byte
/// per face, all indexed in protocol face order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CubeState {
    faces: [[CubeColor; STICKERS_PER_FACE]; FACE_COUNT],
    center_orientations: [u8; FACE_COUNT],
}

impl CubeState {
    /// Build from fixed-size arrays.
    pub const fn new(
        faces: [[CubeColor; STICKERS_PER_FACE]; FACE_COUNT],
        center_orientations: [u8; FACE_COUNT],
    ) -> Self {
        Self { faces, center_orientations }
    }

    /// Build from slices, rejecting any shape other than 6 × 9 and 6.
    pub fn from_faces(
        faces: &[Vec<CubeColor>],
        center_orientations: &[u8],
    ) -> Result<Self, CubeShapeError> {
        if faces.len() != FACE_COUNT {
            return Err(CubeShapeError::FaceCount { actual: faces.len() });
        }

        let mut out = [[CubeColor::Blue; STICKERS_PER_FACE]; FACE_COUNT];
        for (i, face) in faces.iter().enumerate() {
            out[i] = face
                .as_slice()
                .try_into()
                .map_err(|_| CubeShapeError::StickerCount { face: i, actual: face.len() })?;
        }

        let centers = center_orientations
            .try_into()
            .map_err(|_| CubeShapeError::CenterCount { actual: center_orientations.len() })?;

        Ok(Self::new(out, centers))
    }

    /// The solved cube with all centers at orientation 0.
    pub fn solved() -> Self {
        let faces = CubeFace::PROTOCOL_ORDER.map(|face| [face.solved_color(); STICKERS_PER_FACE]);
        Self::new(faces, [0; FACE_COUNT])
    }

    /// Stickers of one face.
    pub fn face(&self, face: CubeFace) -> &[CubeColor; STICKERS_PER_FACE] {
        &self.faces[usize::from(face.protocol_index())]
    }

    /// All faces in protocol order.
    pub fn faces(&self) -> &[[CubeColor; STICKERS_PER_FACE]; FACE_COUNT] {
        &self.faces
    }

    /// Center-orientation byte of one face.
    pub fn center_orientation(&self, face: CubeFace) -> u8 {
        self.center_orientations[usize::from(face.protocol_index())]
    }

    /// All center-orientation bytes in protocol order.
    pub fn center_orientations(&self) -> &[u8; FACE_COUNT] {
        &self.center_orientations
    }

    /// Stickers already showing their face's solved color.
    pub fn correct_sticker_count(&self) -> usize {
        CubeFace::PROTOCOL_ORDER
            .iter()
            .map(|&face| {
                let target = face.solved_color();
                self.face(face).iter().filter(|&&c| c == target).count()
            })
            .sum()
    }

    /// Share of correct stickers, 0.0 to 100.0.
    pub fn solved_percentage(&self) -> f64 {
        self.correct_sticker_count() as f64 * 100.0 / STICKER_COUNT as f64
    }

    /// True when every sticker shows its face's solved color.
    pub fn is_solved(&self) -> bool {
        self.correct_sticker_count() == STICKER_COUNT
    }
}

/// Hardware variant reported by the cube.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CubeType {
    /// Standard model (`0x00`).
    Standard,
    /// Edge model (`0x01`).
    Edge,
    /// Any other byte.
    Unknown(u8),
}

impl CubeType {
    /// Map the type byte.
    pub fn from_u8(value: u8) -> Self {
        match value {
            0x00 => Self::Standard,
            0x01 => Self::Edge,
            other => Self::Unknown(other),
        }
    }

    /// Byte on the wire.
    pub fn to_u8(self) -> u8 {
        match self {
            Self::Standard => 0x00,
            Self::Edge => 0x01,
            Self::Unknown(other) => other,
        }
    }
}
