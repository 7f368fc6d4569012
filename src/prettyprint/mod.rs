pub mod prettyprint;
