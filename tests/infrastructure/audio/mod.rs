mod symphonia_decoder_test;
mod whisper_model_loader_test;
