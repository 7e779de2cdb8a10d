pub mod highgui_window;
pub mod opencv_overlay;
