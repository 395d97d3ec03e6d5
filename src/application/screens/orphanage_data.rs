//! Second wizard step: describe the orphanage and submit it.

use crate::application::effects::{Completion, Outbox, Outcome, Pending, Request, RequestId};
use crate::application::state::Transition;
use crate::domain::{ImageHandle, OrphanageDraft, WizardContext};

/// Focusable rows of the form, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Name,
    About,
    Images,
    Instructions,
    OpeningHours,
    OpenOnWeekends,
    Submit,
}

impl FormField {
    pub const ALL: [FormField; 7] = [
        FormField::Name,
        FormField::About,
        FormField::Images,
        FormField::Instructions,
        FormField::OpeningHours,
        FormField::OpenOnWeekends,
        FormField::Submit,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FormField::Name => "Name",
            FormField::About => "About",
            FormField::Images => "Photos",
            FormField::Instructions => "Instructions",
            FormField::OpeningHours => "Visiting hours",
            FormField::OpenOnWeekends => "Open on weekends?",
            FormField::Submit => "Register",
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(
            self,
            FormField::Name | FormField::About | FormField::Instructions | FormField::OpeningHours
        )
    }

    fn index(&self) -> usize {
        Self::ALL.iter().position(|field| field == self).unwrap_or(0)
    }
}

/// Images offered by the photo library, one of them highlighted.
#[derive(Debug, Clone, PartialEq)]
pub struct ImagePicker {
    choices: Vec<ImageHandle>,
    selected: usize,
}

impl ImagePicker {
    pub fn choices(&self) -> &[ImageHandle] {
        &self.choices
    }

    pub fn selected(&self) -> usize {
        self.selected
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormMessage {
    Info(String),
    Error(String),
}

#[derive(Debug)]
pub struct OrphanageDataScreen {
    context: WizardContext,
    draft: OrphanageDraft,
    focus: FormField,
    /// Cursor position in chars within the focused text field.
    cursor: usize,
    picker: Option<ImagePicker>,
    photo_request: Pending,
    submit_request: Pending,
    message: Option<FormMessage>,
}

impl OrphanageDataScreen {
    pub fn new(context: WizardContext) -> Self {
        Self {
            context,
            draft: OrphanageDraft::default(),
            focus: FormField::Name,
            cursor: 0,
            picker: None,
            photo_request: Pending::default(),
            submit_request: Pending::default(),
            message: None,
        }
    }

    pub fn context(&self) -> &WizardContext {
        &self.context
    }

    pub fn draft(&self) -> &OrphanageDraft {
        &self.draft
    }

    pub fn focus(&self) -> FormField {
        self.focus
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn picker(&self) -> Option<&ImagePicker> {
        self.picker.as_ref()
    }

    pub fn message(&self) -> Option<&FormMessage> {
        self.message.as_ref()
    }

    pub fn is_submitting(&self) -> bool {
        self.submit_request.is_waiting()
    }

    pub fn is_opening_library(&self) -> bool {
        self.photo_request.is_waiting()
    }

    pub fn text(&self, field: FormField) -> Option<&str> {
        match field {
            FormField::Name => Some(&self.draft.name),
            FormField::About => Some(&self.draft.about),
            FormField::Instructions => Some(&self.draft.instructions),
            FormField::OpeningHours => Some(&self.draft.opening_hours),
            _ => None,
        }
    }

    fn text_mut(&mut self, field: FormField) -> Option<&mut String> {
        match field {
            FormField::Name => Some(&mut self.draft.name),
            FormField::About => Some(&mut self.draft.about),
            FormField::Instructions => Some(&mut self.draft.instructions),
            FormField::OpeningHours => Some(&mut self.draft.opening_hours),
            _ => None,
        }
    }

    fn focused_len(&self) -> usize {
        self.text(self.focus).map(|text| text.chars().count()).unwrap_or(0)
    }

    pub fn set_focus(&mut self, field: FormField) {
        self.focus = field;
        self.cursor = self.focused_len();
    }

    pub fn focus_next(&mut self) {
        let next = (self.focus.index() + 1) % FormField::ALL.len();
        self.set_focus(FormField::ALL[next]);
    }

    pub fn focus_previous(&mut self) {
        let len = FormField::ALL.len();
        let previous = (self.focus.index() + len - 1) % len;
        self.set_focus(FormField::ALL[previous]);
    }

    /// Replaces a text field wholesale.
    pub fn set_text(&mut self, field: FormField, value: &str) {
        if let Some(text) = self.text_mut(field) {
            *text = value.to_string();
        }
        if field == self.focus {
            self.cursor = self.focused_len();
        }
    }

    pub fn insert_char(&mut self, c: char) {
        let cursor = self.cursor;
        let focus = self.focus;
        if let Some(text) = self.text_mut(focus) {
            let at = byte_offset(text, cursor);
            text.insert(at, c);
            self.cursor += 1;
        }
    }

    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let cursor = self.cursor;
        let focus = self.focus;
        if let Some(text) = self.text_mut(focus) {
            let at = byte_offset(text, cursor - 1);
            text.remove(at);
            self.cursor -= 1;
        }
    }

    pub fn delete(&mut self) {
        let cursor = self.cursor;
        let focus = self.focus;
        if let Some(text) = self.text_mut(focus) {
            if cursor < text.chars().count() {
                let at = byte_offset(text, cursor);
                text.remove(at);
            }
        }
    }

    pub fn cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.focused_len());
    }

    pub fn cursor_home(&mut self) {
        self.cursor = 0;
    }

    pub fn cursor_end(&mut self) {
        self.cursor = self.focused_len();
    }

    pub fn toggle_weekends(&mut self) {
        self.draft.open_on_weekends = !self.draft.open_on_weekends;
    }

    /// Enter on the focused row: toggles, adds an image, submits, or moves on.
    pub fn activate(&mut self, outbox: &mut Outbox) {
        match self.focus {
            FormField::Images => self.request_image(outbox),
            FormField::OpenOnWeekends => self.toggle_weekends(),
            FormField::Submit => self.submit(outbox),
            _ => self.focus_next(),
        }
    }

    /// Asks the photo library for access and its contents.
    pub fn request_image(&mut self, outbox: &mut Outbox) {
        if self.photo_request.is_waiting() || self.picker.is_some() {
            return;
        }
        self.message = None;
        self.photo_request.start(outbox.issue(Request::OpenPhotoLibrary));
    }

    pub fn picker_next(&mut self) {
        if let Some(picker) = self.picker.as_mut() {
            if picker.selected + 1 < picker.choices.len() {
                picker.selected += 1;
            }
        }
    }

    pub fn picker_previous(&mut self) {
        if let Some(picker) = self.picker.as_mut() {
            picker.selected = picker.selected.saturating_sub(1);
        }
    }

    /// Appends the highlighted image and closes the picker.
    pub fn pick_selected(&mut self) {
        if let Some(picker) = self.picker.take() {
            if let Some(image) = picker.choices.into_iter().nth(picker.selected) {
                tracing::debug!(image = %image.path().display(), "image picked");
                self.draft.add_image(image);
            }
        }
    }

    pub fn cancel_picker(&mut self) {
        self.picker = None;
    }

    /// Posts the draft. Ignored while a submission is already in flight.
    pub fn submit(&mut self, outbox: &mut Outbox) {
        if self.submit_request.is_waiting() {
            return;
        }
        let form = self.draft.to_submission(&self.context);
        tracing::info!(images = form.images().len(), "submitting orphanage");
        self.message = Some(FormMessage::Info("Registering...".to_string()));
        self.submit_request.start(outbox.issue(Request::CreateOrphanage(form)));
    }

    pub fn awaits(&self, id: RequestId) -> bool {
        self.photo_request.is(id) || self.submit_request.is(id)
    }

    pub fn apply(&mut self, completion: Completion) -> Transition {
        match completion.outcome {
            Outcome::PhotoLibrary(result) if self.photo_request.settle(completion.id) => {
                match result {
                    Ok(choices) if choices.is_empty() => {
                        self.message = Some(FormMessage::Info("No photos found in the library.".to_string()));
                    }
                    Ok(choices) => {
                        self.picker = Some(ImagePicker { choices, selected: 0 });
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "photo library unavailable");
                        self.message = Some(FormMessage::Error(e.to_string()));
                    }
                }
                Transition::Stay
            }
            Outcome::Created(result) if self.submit_request.settle(completion.id) => match result {
                Ok(()) => {
                    tracing::info!("orphanage registered");
                    Transition::ResetToMap
                }
                Err(e) => {
                    tracing::warn!(error = %e, "orphanage registration failed");
                    let hint = if e.is_rejection() { "check the form" } else { "check your connection" };
                    self.message = Some(FormMessage::Error(format!("{}. Press Ctrl+S to retry ({}).", e, hint)));
                    Transition::Stay
                }
            },
            other => {
                tracing::debug!(?other, "discarding outcome for orphanage form");
                Transition::Stay
            }
        }
    }
}

fn byte_offset(text: &str, char_index: usize) -> usize {
    text.char_indices()
        .nth(char_index)
        .map(|(offset, _)| offset)
        .unwrap_or(text.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Coordinate;
    use crate::infrastructure::{ApiError, PhotoError};

    fn screen() -> OrphanageDataScreen {
        OrphanageDataScreen::new(WizardContext::new(Coordinate::new(-23.5, -46.6).unwrap()))
    }

    fn open_library(screen: &mut OrphanageDataScreen, outbox: &mut Outbox, choices: &[&str]) {
        screen.request_image(outbox);
        let effect = outbox.drain().pop().unwrap();
        assert_eq!(effect.request, Request::OpenPhotoLibrary);
        screen.apply(Completion {
            id: effect.id,
            outcome: Outcome::PhotoLibrary(Ok(choices.iter().map(ImageHandle::new).collect())),
        });
    }

    #[test]
    fn test_new_form_is_empty() {
        let screen = screen();
        assert_eq!(screen.draft(), &OrphanageDraft::default());
        assert_eq!(screen.focus(), FormField::Name);
        assert!(!screen.is_submitting());
    }

    #[test]
    fn test_typing_edits_focused_field_only() {
        let mut screen = screen();
        for c in "Lar".chars() {
            screen.insert_char(c);
        }
        screen.focus_next();
        for c in "Sobre".chars() {
            screen.insert_char(c);
        }

        assert_eq!(screen.draft().name, "Lar");
        assert_eq!(screen.draft().about, "Sobre");
        assert!(screen.draft().instructions.is_empty());
    }

    #[test]
    fn test_cursor_editing_handles_multibyte_chars() {
        let mut screen = screen();
        screen.set_focus(FormField::Instructions);
        for c in "Instrues".chars() {
            screen.insert_char(c);
        }
        screen.cursor_left();
        screen.cursor_left();
        screen.insert_char('ç');
        screen.insert_char('õ');
        assert_eq!(screen.draft().instructions, "Instruções");

        screen.backspace();
        screen.delete();
        assert_eq!(screen.draft().instructions, "Instruçs");

        screen.cursor_home();
        screen.delete();
        assert_eq!(screen.draft().instructions, "nstruçs");
        screen.cursor_end();
        assert_eq!(screen.cursor(), 7);
    }

    #[test]
    fn test_typing_on_non_text_row_is_ignored() {
        let mut screen = screen();
        screen.set_focus(FormField::OpenOnWeekends);
        screen.insert_char('x');
        screen.backspace();
        assert_eq!(screen.draft(), &OrphanageDraft::default());
    }

    #[test]
    fn test_focus_wraps_around() {
        let mut screen = screen();
        screen.focus_previous();
        assert_eq!(screen.focus(), FormField::Submit);
        screen.focus_next();
        assert_eq!(screen.focus(), FormField::Name);
    }

    #[test]
    fn test_activate_toggles_weekends() {
        let mut screen = screen();
        let mut outbox = Outbox::default();
        screen.set_focus(FormField::OpenOnWeekends);

        screen.activate(&mut outbox);
        assert!(screen.draft().open_on_weekends);
        screen.activate(&mut outbox);
        assert!(!screen.draft().open_on_weekends);
        assert!(outbox.drain().is_empty());
    }

    #[test]
    fn test_each_pick_appends_one_image() {
        let mut screen = screen();
        let mut outbox = Outbox::default();

        for _ in 0..3 {
            open_library(&mut screen, &mut outbox, &["/lib/a.jpg", "/lib/b.jpg"]);
            screen.pick_selected();
        }
        open_library(&mut screen, &mut outbox, &["/lib/a.jpg", "/lib/b.jpg"]);
        screen.picker_next();
        screen.picker_next();
        screen.pick_selected();

        let names: Vec<String> = screen.draft().images().iter().map(|i| i.display_name()).collect();
        assert_eq!(names, vec!["a.jpg", "a.jpg", "a.jpg", "b.jpg"]);
        assert!(screen.picker().is_none());
    }

    #[test]
    fn test_cancelled_pick_changes_nothing() {
        let mut screen = screen();
        let mut outbox = Outbox::default();

        open_library(&mut screen, &mut outbox, &["/lib/a.jpg"]);
        assert!(screen.picker().is_some());
        screen.cancel_picker();

        assert!(screen.draft().images().is_empty());
    }

    #[test]
    fn test_denied_library_shows_message_without_side_effects() {
        let mut screen = screen();
        let mut outbox = Outbox::default();
        screen.request_image(&mut outbox);
        let effect = outbox.drain().pop().unwrap();

        screen.apply(Completion {
            id: effect.id,
            outcome: Outcome::PhotoLibrary(Err(PhotoError::AccessDenied)),
        });

        assert_eq!(
            screen.message(),
            Some(&FormMessage::Error("We need access to your photos.".to_string()))
        );
        assert!(screen.picker().is_none());
        assert!(screen.draft().images().is_empty());
        assert!(!screen.is_opening_library());
    }

    #[test]
    fn test_library_request_is_not_duplicated() {
        let mut screen = screen();
        let mut outbox = Outbox::default();
        screen.request_image(&mut outbox);
        screen.request_image(&mut outbox);
        assert_eq!(outbox.drain().len(), 1);
    }

    #[test]
    fn test_submit_issues_single_create_request() {
        let mut screen = screen();
        let mut outbox = Outbox::default();
        screen.set_text(FormField::Name, "Lar Feliz");
        screen.toggle_weekends();

        screen.submit(&mut outbox);
        screen.submit(&mut outbox);

        let effects = outbox.drain();
        assert_eq!(effects.len(), 1);
        match &effects[0].request {
            Request::CreateOrphanage(form) => {
                assert_eq!(form.text_field("name"), Some("Lar Feliz"));
                assert_eq!(form.text_field("open_on_weekends"), Some("true"));
                assert_eq!(form.text_field("latitude"), Some("-23.5"));
            }
            other => panic!("unexpected request {:?}", other),
        }
        assert!(screen.is_submitting());
    }

    #[test]
    fn test_successful_submit_resets_to_map() {
        let mut screen = screen();
        let mut outbox = Outbox::default();
        screen.submit(&mut outbox);
        let effect = outbox.drain().pop().unwrap();

        let transition = screen.apply(Completion {
            id: effect.id,
            outcome: Outcome::Created(Ok(())),
        });

        assert!(matches!(transition, Transition::ResetToMap));
    }

    #[test]
    fn test_failed_submit_keeps_draft_for_retry() {
        let mut screen = screen();
        let mut outbox = Outbox::default();
        screen.set_text(FormField::About, "Kept");
        screen.submit(&mut outbox);
        let effect = outbox.drain().pop().unwrap();

        let transition = screen.apply(Completion {
            id: effect.id,
            outcome: Outcome::Created(Err(ApiError::Status { status: 400 })),
        });

        assert!(matches!(transition, Transition::Stay));
        assert_eq!(screen.draft().about, "Kept");
        assert!(!screen.is_submitting());
        match screen.message() {
            Some(FormMessage::Error(text)) => assert!(text.contains("HTTP 400")),
            other => panic!("unexpected message {:?}", other),
        }

        screen.submit(&mut outbox);
        assert_eq!(outbox.drain().len(), 1);
    }

    #[test]
    fn test_stale_completion_is_ignored() {
        let mut screen = screen();
        let mut outbox = Outbox::default();
        screen.submit(&mut outbox);
        let effect = outbox.drain().pop().unwrap();

        let transition = screen.apply(Completion {
            id: effect.id,
            outcome: Outcome::PhotoLibrary(Ok(vec![ImageHandle::new("/x.jpg")])),
        });

        assert!(matches!(transition, Transition::Stay));
        assert!(screen.picker().is_none());
        assert!(screen.is_submitting());
    }
}
