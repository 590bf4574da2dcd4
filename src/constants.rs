//! Global constants for the snap widget

/// Page elements the widget binds to.
pub mod dom {
    /// Drop target that also opens the file picker on click
    pub const UPLOAD_CONTAINER_ID: &str = "upload-container";
    pub const UPLOAD_STATUS_ID: &str = "upload-status";
    pub const DISPLAYED_IMAGE_ID: &str = "displayed-image";
    pub const DELETE_BUTTON_ID: &str = "delete-image";
    /// SVG `<filter>` holding the displacement map and the noise source
    pub const DISSOLVE_FILTER_ID: &str = "dissolve-filter";
    pub const DISPLACEMENT_MAP_SELECTOR: &str = "feDisplacementMap";
    pub const NOISE_SELECTOR: &str = "feTurbulence[result=\"bigNoise\"]";
    pub const MAIN_CONTAINER_SELECTOR: &str = ".container";
    pub const BROWSER_WARNING_SELECTOR: &str = ".safari-warning";
    pub const THEME_TOGGLE_ID: &str = "theme-toggle";
    /// Inline `<script type="application/json">` carrying a `WidgetConfig`
    pub const CONFIG_SCRIPT_ID: &str = "snap-config";

    pub const HIDDEN_CLASS: &str = "hidden";
    pub const DRAG_OVER_CLASS: &str = "drag-over";
}

/// Status line texts.
pub mod messages {
    pub const NOT_AN_IMAGE: &str = "Please drop an image file";
    pub const UPLOADING: &str = "Uploading...";
    pub const UPLOAD_SUCCEEDED: &str = "Upload successful!";
    pub const UPLOAD_FAILED: &str = "Upload failed";
    pub const DELETE_SUCCEEDED: &str = "Image deleted successfully!";
    pub const DELETE_FAILED: &str = "Delete failed";
    pub const BUSY: &str = "Please wait for the current operation to finish";
}

/// HTTP surface of the storage service.
pub mod endpoints {
    pub const UPLOAD_PATH: &str = "/upload";
    pub const DELETE_PATH: &str = "/delete/";
    /// Multipart field carrying the image
    pub const UPLOAD_FIELD: &str = "file";
    pub const DEFAULT_UPLOADS_PATH: &str = "/uploads/";
}

/// MIME prefix every accepted file must carry
pub const IMAGE_MIME_PREFIX: &str = "image/";

/// `accept` attribute of the transient file input
pub const PICKER_ACCEPT: &str = "image/*";

/// LocalStorage key of the theme preference
pub const THEME_STORAGE_KEY: &str = "theme";
