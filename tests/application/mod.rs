mod audio_normalizer_test;
mod model_registry_test;
mod result_assembler_test;
