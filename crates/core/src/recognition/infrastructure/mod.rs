pub mod opencv_lbph_recognizer;
