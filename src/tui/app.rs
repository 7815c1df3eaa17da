use ratatui::widgets::TableState;

use crate::models::{ClockTime, Day, PaletteColor, Task, TaskDraft};
use crate::planner::Planner;
use crate::schedule::agenda_for;

#[derive(PartialEq)]
pub enum InputMode {
    Normal,
    Editing,
    Adding,
}

pub enum ViewMode {
    Day,
    Week,
}

#[derive(Clone, Copy)]
pub enum InputField {
    None,
    Name,
    Start,
    End,
    Note,
}

/// State for the multi-step "Add Block" wizard.
#[derive(Default)]
pub struct AddState {
    pub name: String,
    pub start: String,
    pub end: String,
    pub step: usize, // 0: Name, 1: Start, 2: End, 3: Note
}

pub struct App {
    pub planner: Planner,
    pub state: TableState,
    pub view_mode: ViewMode,
    pub input_mode: InputMode,
    pub input_field: InputField,
    pub input_buffer: String,
    pub target_id: Option<String>,
    pub add_state: AddState,
    /// The day whose schedule the table shows.
    pub shown_day: Day,
    /// Last error or confirmation, shown in the help bar.
    pub status: Option<String>,
}

impl App {
    pub fn new(planner: Planner) -> App {
        let shown_day = Day::of(&planner.now());
        let mut app = App {
            planner,
            state: TableState::default(),
            view_mode: ViewMode::Day,
            input_mode: InputMode::Normal,
            input_field: InputField::None,
            input_buffer: String::new(),
            target_id: None,
            add_state: AddState::default(),
            shown_day,
            status: None,
        };
        app.clamp_selection();
        app
    }

    /// Blocks on the shown day, in start order.
    pub fn shown_agenda(&self) -> Vec<&Task> {
        agenda_for(self.planner.tasks(), self.shown_day)
    }

    fn selected_id(&self) -> Option<String> {
        let i = self.state.selected()?;
        self.shown_agenda().get(i).map(|t| t.id.clone())
    }

    fn clamp_selection(&mut self) {
        let len = self.shown_agenda().len();
        if len == 0 {
            self.state.select(None);
        } else if let Some(i) = self.state.selected() {
            if i >= len {
                self.state.select(Some(len - 1));
            }
        } else {
            self.state.select(Some(0));
        }
    }

    fn report<T>(&mut self, result: crate::Result<T>) -> Option<T> {
        match result {
            Ok(v) => Some(v),
            Err(e) => {
                self.status = Some(e.to_string());
                None
            }
        }
    }

    /// Called once per refresh.
    pub fn on_tick(&mut self) {
        let result = self.planner.tick();
        if let Some(Some(outcome)) = self.report(result) {
            self.status = Some(format!("New week {}: completion marks cleared", outcome.week_start));
        }
    }

    /// Selects the next block on the shown day.
    pub fn next(&mut self) {
        let len = self.shown_agenda().len();
        if len == 0 { return; }
        let i = match self.state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.state.select(Some(i));
    }

    /// Selects the previous block on the shown day.
    pub fn previous(&mut self) {
        let len = self.shown_agenda().len();
        if len == 0 { return; }
        let i = match self.state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    pub fn next_day(&mut self) {
        self.shown_day = self.shown_day.next();
        self.state.select(None);
        self.clamp_selection();
    }

    pub fn previous_day(&mut self) {
        self.shown_day = self.shown_day.prev();
        self.state.select(None);
        self.clamp_selection();
    }

    /// Flips the completed flag of the selected block.
    pub fn toggle_selected(&mut self) {
        if let Some(id) = self.selected_id() {
            let result = self.planner.toggle(&id);
            self.report(result);
        }
    }

    /// Deletes the selected block.
    pub fn delete_selected(&mut self) {
        if let Some(id) = self.selected_id() {
            let result = self.planner.delete(&id);
            if let Some(true) = self.report(result) {
                self.status = Some("Block deleted".into());
            }
            self.clamp_selection();
        }
    }

    /// Moves the selected block to the next palette colour.
    pub fn cycle_color(&mut self) {
        let Some(id) = self.selected_id() else { return };
        let Some(task) = self.planner.store().get(&id) else { return };
        let mut draft = TaskDraft::from(task);
        let next = PaletteColor::resolve(draft.color.as_deref()).next();
        draft.color = Some(next.name().to_string());
        let result = self.planner.update(&id, draft);
        self.report(result);
    }

    pub fn toggle_view(&mut self) {
        self.view_mode = match self.view_mode {
            ViewMode::Day => ViewMode::Week,
            ViewMode::Week => ViewMode::Day,
        };
    }

    /// Starts the "Add Block" wizard for the shown day.
    pub fn start_add(&mut self) {
        self.input_mode = InputMode::Adding;
        self.add_state = AddState::default();
        self.input_buffer.clear();
        self.status = None;
    }

    /// Opens the edit box for one field of the selected block, pre-filled.
    pub fn start_edit(&mut self, field: InputField) {
        let Some(id) = self.selected_id() else { return };
        let Some(task) = self.planner.store().get(&id) else { return };
        self.input_buffer = match field {
            InputField::Name => task.name.clone(),
            InputField::Start => task.start_time.to_string(),
            InputField::End => task.end_time.to_string(),
            InputField::Note => task.note.clone().unwrap_or_default(),
            InputField::None => return,
        };
        self.input_mode = InputMode::Editing;
        self.input_field = field;
        self.target_id = Some(id);
        self.status = None;
    }

    pub fn cancel_input(&mut self) {
        self.input_mode = InputMode::Normal;
        self.input_field = InputField::None;
        self.input_buffer.clear();
    }

    /// Handles Enter in the input box.
    pub fn handle_input(&mut self) {
        let input = self.input_buffer.trim().to_string();
        match self.input_mode {
            InputMode::Adding => self.advance_add(input),
            InputMode::Editing => {
                self.apply_edit(input);
                self.cancel_input();
            }
            InputMode::Normal => {}
        }
    }

    fn advance_add(&mut self, input: String) {
        self.input_buffer.clear();
        match self.add_state.step {
            0 => {
                if input.is_empty() { return; }
                self.add_state.name = input;
                self.input_buffer = "09:00".into();
            }
            1 => {
                self.add_state.start = input;
                self.input_buffer = "10:00".into();
            }
            2 => self.add_state.end = input,
            _ => {
                let note = if input.is_empty() { None } else { Some(input) };
                self.finish_add(note);
                self.cancel_input();
                return;
            }
        }
        self.add_state.step += 1;
    }

    fn finish_add(&mut self, note: Option<String>) {
        let start: crate::Result<ClockTime> = self.add_state.start.parse();
        let end: crate::Result<ClockTime> = self.add_state.end.parse();
        let result = start.and_then(|start_time| {
            end.and_then(|end_time| {
                self.planner.add(TaskDraft {
                    day: self.shown_day,
                    start_time,
                    end_time,
                    name: std::mem::take(&mut self.add_state.name),
                    note,
                    color: None,
                })
            })
        });
        if let Some(task) = self.report(result) {
            self.status = Some(format!("Added '{}'", task.name));
            if let Some(i) = self.shown_agenda().iter().position(|t| t.id == task.id) {
                self.state.select(Some(i));
            }
        }
    }

    fn apply_edit(&mut self, input: String) {
        let Some(id) = self.target_id.take() else { return };
        let Some(task) = self.planner.store().get(&id) else { return };
        let mut draft = TaskDraft::from(task);
        let parsed: crate::Result<()> = match self.input_field {
            InputField::Name => {
                draft.name = input;
                Ok(())
            }
            InputField::Start => input.parse().map(|t| draft.start_time = t),
            InputField::End => input.parse().map(|t| draft.end_time = t),
            InputField::Note => {
                draft.note = Some(input);
                Ok(())
            }
            InputField::None => return,
        };
        let result = parsed.and_then(|_| self.planner.update(&id, draft));
        self.report(result);
        self.clamp_selection();
    }
}
