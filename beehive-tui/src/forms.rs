//! Text-entry state for the upload and edit forms.

use std::path::PathBuf;

use beehive_core::{Action, NewUpload, Sentiment, Upload, UploadEdit};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Files,
    Title,
    Description,
    Sentiment,
    Audio,
}

impl FormField {
    pub fn label(&self) -> &'static str {
        match self {
            FormField::Files => "Files",
            FormField::Title => "Title",
            FormField::Description => "Description",
            FormField::Sentiment => "Sentiment",
            FormField::Audio => "Voice note",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadForm {
    /// Comma separated paths.
    pub files: String,
    pub title: String,
    pub description: String,
    pub sentiment: Sentiment,
    pub audio: String,
    pub focus: usize,
    /// Set when the form edits an existing upload instead of creating one.
    pub editing: Option<String>,
}

impl Default for UploadForm {
    fn default() -> Self {
        Self {
            files: String::new(),
            title: String::new(),
            description: String::new(),
            sentiment: Sentiment::Neutral,
            audio: String::new(),
            focus: 0,
            editing: None,
        }
    }
}

impl UploadForm {
    pub fn for_edit(upload: &Upload) -> Self {
        Self {
            title: upload.title.clone(),
            description: upload.description.clone(),
            sentiment: upload.sentiment().unwrap_or(Sentiment::Neutral),
            editing: Some(upload.id.clone()),
            ..Self::default()
        }
    }

    pub fn fields(&self) -> &'static [FormField] {
        if self.editing.is_some() {
            &[FormField::Title, FormField::Description, FormField::Sentiment]
        } else {
            &[
                FormField::Files,
                FormField::Title,
                FormField::Description,
                FormField::Sentiment,
                FormField::Audio,
            ]
        }
    }

    pub fn focused(&self) -> FormField {
        let fields = self.fields();
        fields[self.focus % fields.len()]
    }

    pub fn next_field(&mut self) {
        self.focus = (self.focus + 1) % self.fields().len();
    }

    pub fn value(&self, field: FormField) -> String {
        match field {
            FormField::Files => self.files.clone(),
            FormField::Title => self.title.clone(),
            FormField::Description => self.description.clone(),
            FormField::Sentiment => self.sentiment.to_string(),
            FormField::Audio => self.audio.clone(),
        }
    }

    fn text_mut(&mut self, field: FormField) -> Option<&mut String> {
        match field {
            FormField::Files => Some(&mut self.files),
            FormField::Title => Some(&mut self.title),
            FormField::Description => Some(&mut self.description),
            FormField::Audio => Some(&mut self.audio),
            FormField::Sentiment => None,
        }
    }

    /// Typing on the sentiment field cycles it instead of inserting text.
    pub fn input(&mut self, c: char) {
        let field = self.focused();
        match self.text_mut(field) {
            Some(text) => text.push(c),
            None if c == ' ' => self.cycle_sentiment(),
            None => {
                if let Some(sentiment) = Sentiment::ALL
                    .iter()
                    .find(|s| s.as_str().starts_with(c.to_ascii_lowercase()))
                {
                    self.sentiment = *sentiment;
                }
            }
        }
    }

    pub fn backspace(&mut self) {
        let field = self.focused();
        if let Some(text) = self.text_mut(field) {
            text.pop();
        }
    }

    pub fn cycle_sentiment(&mut self) {
        let index = Sentiment::ALL
            .iter()
            .position(|s| *s == self.sentiment)
            .unwrap_or(0);
        self.sentiment = Sentiment::ALL[(index + 1) % Sentiment::ALL.len()];
    }

    pub fn to_action(&self) -> Action {
        match &self.editing {
            Some(id) => Action::EditUpload(UploadEdit {
                id: id.clone(),
                title: self.title.clone(),
                description: self.description.clone(),
                sentiment: Some(self.sentiment),
            }),
            None => Action::CreateUpload(NewUpload {
                files: split_paths(&self.files),
                title: self.title.clone(),
                description: self.description.clone(),
                sentiment: self.sentiment,
                audio: Some(self.audio.trim())
                    .filter(|path| !path.is_empty())
                    .map(PathBuf::from),
            }),
        }
    }
}

fn split_paths(raw: &str) -> Vec<PathBuf> {
    raw.split(',')
        .map(str::trim)
        .filter(|path| !path.is_empty())
        .map(PathBuf::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_str(form: &mut UploadForm, text: &str) {
        for c in text.chars() {
            form.input(c);
        }
    }

    #[test]
    fn test_new_upload_form() {
        let mut form = UploadForm::default();
        type_str(&mut form, "a.png, b.jpg");
        form.next_field();
        type_str(&mut form, "Sunset");
        form.next_field();
        type_str(&mut form, "Beach at dusk");
        form.next_field();
        form.input('p');

        match form.to_action() {
            Action::CreateUpload(upload) => {
                assert_eq!(
                    upload.files,
                    vec![PathBuf::from("a.png"), PathBuf::from("b.jpg")]
                );
                assert_eq!(upload.title, "Sunset");
                assert_eq!(upload.sentiment, Sentiment::Positive);
                assert_eq!(upload.audio, None);
                assert!(upload.validate().is_ok());
            }
            other => panic!("unexpected action {:?}", other),
        }
    }

    #[test]
    fn test_edit_form_skips_file_fields() {
        let upload = Upload {
            id: "up-1".to_string(),
            filename: "a.png".to_string(),
            title: "Old".to_string(),
            description: "desc".to_string(),
            audio_filename: None,
            sentiment: Some("negative".to_string()),
            created_at: None,
        };
        let mut form = UploadForm::for_edit(&upload);
        assert_eq!(form.focused(), FormField::Title);
        assert_eq!(form.sentiment, Sentiment::Negative);

        form.backspace();
        form.next_field();
        form.next_field();
        form.input(' ');
        form.next_field();
        assert_eq!(form.focused(), FormField::Title);

        assert_eq!(
            form.to_action(),
            Action::EditUpload(UploadEdit {
                id: "up-1".to_string(),
                title: "Ol".to_string(),
                description: "desc".to_string(),
                sentiment: Some(Sentiment::Positive),
            })
        );
    }
}
