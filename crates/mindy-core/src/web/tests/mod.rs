mod cgi_tests;
