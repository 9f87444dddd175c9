mod test_projector;
