mod test_run;
