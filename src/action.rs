#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Direction {
    Up,
    Down,
    PageUp,
    PageDown,
    Top,
    Bottom,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Quit,
    Navigate(Direction),
    EnterFilterMode,
    ApplyFilter,
    ClearFilter,
    UpdateFilter(String),
    CycleSort,
    ReverseSort,
    ToggleHelp,
    None,
}
