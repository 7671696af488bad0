mod profile_form;

pub use profile_form::ProfileEditForm;
