pub mod diagnostics_panel;
pub mod heat_layer;
pub mod info_popup;
pub mod map_view;
