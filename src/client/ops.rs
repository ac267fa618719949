//! The operation layer: thin request builders over the client core.
//!
//! Every server operation is a formatting exercise (build a form, pick an
//! endpoint, attach whichever security token the endpoint demands) plus a
//! classification against the one [`OutcomeShape`] the operation is permanently
//! associated with. The association is the static table in
//! [`OpKind::expected_shape`]; no shape is ever chosen at runtime from a
//! string.
//!
//! Ticks-protected operations (listing, upload target) go through
//! [`FileHost::perform_with_retry`]. Anti-forgery operations fetch their token
//! fresh every time, so they never retry: a failure is final.

// self
use crate::{
	_prelude::*,
	auth::{SessionState, SubjectName, antiforgery::ANTI_FORGERY_FIELD},
	client::FileHost,
	error::PayloadError,
	http::{MultipartPart, Response, WebRequest},
	outcome::OutcomeShape,
	scrape::{Listing, ListingParser},
};

/// Endpoint paths of the web UI, relative to the site base URL.
mod endpoint {
	pub const LOGIN: &str = "action/Login/TopBarLogin";
	pub const LOGOUT: &str = "action/Login/LogOut";
	pub const LOAD_TREE: &str = "action/tree/loadtree";
	pub const NEW_FOLDER: &str = "action/FolderOptions/NewFolderAction";
	pub const DELETE_FOLDER: &str = "action/FolderOptions/DeleteFolderAction";
	pub const RENAME_FOLDER: &str = "action/FolderOptions/RenameFolderAction";
	pub const MOVE_FILE: &str = "action/FileDetails/MoveFileAction";
	pub const UPLOAD_URL: &str = "action/Upload/GetUrl";
	pub const SEARCH: &str = "action/SearchFiles";
}

/// Server operations the client can perform.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpKind {
	/// Binds a session subject via the top-bar login form.
	Login,
	/// Ends the session.
	Logout,
	/// Lists one folder of the subject's tree; ticks-protected and retryable.
	ListFolder,
	/// Creates a folder; anti-forgery-protected.
	CreateFolder,
	/// Removes a folder; anti-forgery-protected.
	RemoveFolder,
	/// Renames a folder; anti-forgery-protected.
	RenameFolder,
	/// Moves a file between folders; anti-forgery-protected.
	MoveFile,
	/// Requests an upload target URL; ticks-protected and retryable.
	UploadTarget,
	/// Posts file bytes to a previously requested upload target.
	Upload,
	/// Searches files by name.
	Search,
}
impl OpKind {
	/// Returns the success shape permanently associated with this operation.
	pub const fn expected_shape(self) -> OutcomeShape {
		match self {
			Self::Login | Self::CreateFolder => OutcomeShape::JsonDataStatusOk,
			Self::RemoveFolder | Self::MoveFile => OutcomeShape::JsonDataStatusZero,
			Self::RenameFolder => OutcomeShape::JsonIsSuccessTrue,
			Self::UploadTarget => OutcomeShape::JsonUrl,
			Self::Logout | Self::ListFolder | Self::Upload | Self::Search =>
				OutcomeShape::Status200,
		}
	}

	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Login => "login",
			Self::Logout => "logout",
			Self::ListFolder => "list_folder",
			Self::CreateFolder => "create_folder",
			Self::RemoveFolder => "remove_folder",
			Self::RenameFolder => "rename_folder",
			Self::MoveFile => "move_file",
			Self::UploadTarget => "upload_target",
			Self::Upload => "upload",
			Self::Search => "search",
		}
	}
}
impl Display for OpKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Upload target returned by the site before a multipart upload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadTarget {
	/// Absolute URL the file bytes must be posted to.
	pub url: Url,
}

#[derive(Deserialize)]
struct UploadReply {
	#[serde(rename = "Url")]
	url: String,
}

impl FileHost {
	/// Logs in and binds `subject` to the session.
	pub async fn login(&self, subject: &SubjectName, password: &str) -> Result<()> {
		let request = WebRequest::post(self.endpoint(endpoint::LOGIN)?)
			.form_field("Login", subject.as_ref())
			.form_field("Password", password);

		self.perform_once(OpKind::Login, request).await?;

		*self.session.write() = SessionState::Authenticated { subject: subject.clone() };

		Ok(())
	}

	/// Ends the session and drops the subject's cached ticks.
	pub async fn logout(&self) -> Result<()> {
		let request = WebRequest::get(self.endpoint(endpoint::LOGOUT)?);

		self.perform_once(OpKind::Logout, request).await?;

		let previous = std::mem::take(&mut *self.session.write());

		if let Some(subject) = previous.subject() {
			self.ticks().invalidate(subject);
		}

		Ok(())
	}

	/// Lists one folder of the session subject's tree, returning the raw
	/// response; the body is the site's HTML listing fragment.
	pub async fn list_folder(&self, folder_id: u64) -> Result<Response> {
		let subject = self.require_subject(OpKind::ListFolder)?;
		let url = self.endpoint(endpoint::LOAD_TREE)?;

		self.perform_with_retry(OpKind::ListFolder, &subject, |ticks| {
			WebRequest::post(url.clone())
				.form_field("AccountName", subject.as_ref())
				.form_field("FolderId", folder_id.to_string())
				.form_field("ticks", ticks)
		})
		.await
	}

	/// Lists one folder and translates the fragment through `parser`.
	pub async fn list_folder_parsed(
		&self,
		folder_id: u64,
		parser: &dyn ListingParser,
	) -> Result<Listing> {
		let response = self.list_folder(folder_id).await?;

		Ok(parser.parse_listing(&response.text())?)
	}

	/// Creates a folder under `parent_id`.
	pub async fn create_folder(&self, name: &str, parent_id: u64) -> Result<()> {
		let subject = self.require_subject(OpKind::CreateFolder)?;
		let token = self.antiforgery().fetch(&subject).await?;
		let request = WebRequest::post(self.endpoint(endpoint::NEW_FOLDER)?)
			.form_field("FolderName", name)
			.form_field("FolderId", parent_id.to_string())
			.form_field(ANTI_FORGERY_FIELD, token);

		self.perform_once(OpKind::CreateFolder, request).await?;

		Ok(())
	}

	/// Removes the folder `folder_id`.
	pub async fn remove_folder(&self, folder_id: u64) -> Result<()> {
		let subject = self.require_subject(OpKind::RemoveFolder)?;
		let token = self.antiforgery().fetch(&subject).await?;
		let request = WebRequest::post(self.endpoint(endpoint::DELETE_FOLDER)?)
			.form_field("FolderId", folder_id.to_string())
			.form_field(ANTI_FORGERY_FIELD, token);

		self.perform_once(OpKind::RemoveFolder, request).await?;

		Ok(())
	}

	/// Renames the folder `folder_id` to `new_name`.
	pub async fn rename_folder(&self, folder_id: u64, new_name: &str) -> Result<()> {
		let subject = self.require_subject(OpKind::RenameFolder)?;
		let token = self.antiforgery().fetch(&subject).await?;
		let request = WebRequest::post(self.endpoint(endpoint::RENAME_FOLDER)?)
			.form_field("FolderId", folder_id.to_string())
			.form_field("Name", new_name)
			.form_field(ANTI_FORGERY_FIELD, token);

		self.perform_once(OpKind::RenameFolder, request).await?;

		Ok(())
	}

	/// Moves file `file_id` from `source_folder_id` into `target_folder_id`.
	pub async fn move_file(
		&self,
		file_id: u64,
		source_folder_id: u64,
		target_folder_id: u64,
	) -> Result<()> {
		let subject = self.require_subject(OpKind::MoveFile)?;
		let token = self.antiforgery().fetch(&subject).await?;
		let request = WebRequest::post(self.endpoint(endpoint::MOVE_FILE)?)
			.form_field("FileId", file_id.to_string())
			.form_field("FolderId", source_folder_id.to_string())
			.form_field("NewFolderId", target_folder_id.to_string())
			.form_field(ANTI_FORGERY_FIELD, token);

		self.perform_once(OpKind::MoveFile, request).await?;

		Ok(())
	}

	/// Requests an upload target for `folder_id`; ticks-protected and
	/// retryable.
	pub async fn request_upload_target(&self, folder_id: u64) -> Result<UploadTarget> {
		let subject = self.require_subject(OpKind::UploadTarget)?;
		let url = self.endpoint(endpoint::UPLOAD_URL)?;
		let response = self
			.perform_with_retry(OpKind::UploadTarget, &subject, |ticks| {
				WebRequest::post(url.clone())
					.form_field("AccountName", subject.as_ref())
					.form_field("FolderId", folder_id.to_string())
					.form_field("ticks", ticks)
			})
			.await?;
		// Classification only proved a `Url` field exists; decoding it can still
		// fail and must carry the field path when it does.
		let mut deserializer = serde_json::Deserializer::from_slice(response.body());
		let reply: UploadReply = serde_path_to_error::deserialize(&mut deserializer)
			.map_err(|source| PayloadError::Malformed { source })?;
		let url = Url::parse(&reply.url).map_err(|source| PayloadError::UploadUrl { source })?;

		Ok(UploadTarget { url })
	}

	/// Uploads `data` as `file_name` into `folder_id`: requests an upload
	/// target, then posts the bytes as a multipart form to it.
	pub async fn upload(
		&self,
		folder_id: u64,
		file_name: &str,
		content_type: &str,
		data: Vec<u8>,
	) -> Result<Response> {
		let target = self.request_upload_target(folder_id).await?;
		let request = WebRequest::post(target.url)
			.part(MultipartPart::file("files[]", file_name, content_type, data));

		self.perform_once(OpKind::Upload, request).await
	}

	/// Searches files by name; available without a session.
	pub async fn search(&self, query: &str, page: u32) -> Result<Response> {
		let request = WebRequest::get(self.endpoint(endpoint::SEARCH)?)
			.form_field("FileName", query)
			.form_field("Page", page.to_string());

		self.perform_once(OpKind::Search, request).await
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn shape_table_is_total_and_stable() {
		assert_eq!(OpKind::Login.expected_shape(), OutcomeShape::JsonDataStatusOk);
		assert_eq!(OpKind::CreateFolder.expected_shape(), OutcomeShape::JsonDataStatusOk);
		assert_eq!(OpKind::RemoveFolder.expected_shape(), OutcomeShape::JsonDataStatusZero);
		assert_eq!(OpKind::MoveFile.expected_shape(), OutcomeShape::JsonDataStatusZero);
		assert_eq!(OpKind::RenameFolder.expected_shape(), OutcomeShape::JsonIsSuccessTrue);
		assert_eq!(OpKind::UploadTarget.expected_shape(), OutcomeShape::JsonUrl);
		assert_eq!(OpKind::Logout.expected_shape(), OutcomeShape::Status200);
		assert_eq!(OpKind::ListFolder.expected_shape(), OutcomeShape::Status200);
		assert_eq!(OpKind::Upload.expected_shape(), OutcomeShape::Status200);
		assert_eq!(OpKind::Search.expected_shape(), OutcomeShape::Status200);
	}

	#[test]
	fn labels_are_snake_case() {
		assert_eq!(OpKind::ListFolder.as_str(), "list_folder");
		assert_eq!(OpKind::UploadTarget.to_string(), "upload_target");
	}
}
