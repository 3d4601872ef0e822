mod writers_test;
