use ratatui::style::Color;

pub const PLAYED: Color = Color::from_u32(0x003b82c4);
pub const BUFFERED: Color = Color::from_u32(0x001f4e79);
pub const TRACK: Color = Color::from_u32(0x00101820);
pub const TEXT: Color = Color::from_u32(0x00e8e4d8);
pub const DIMMED: Color = Color::from_u32(0x00505050);
pub const SELECTION: Color = Color::from_u32(0x00d9a441);
