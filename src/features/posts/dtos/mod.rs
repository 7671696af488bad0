mod post_form;

pub use post_form::{PostDraft, PostFormData, PostFormValues, UploadedImage, PUB_DATE_FORMAT};
